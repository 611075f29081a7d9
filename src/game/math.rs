use serde::{
    Deserialize,
    Serialize
};

pub type Vector2F = Vector2X<f32>;
pub type Vector2I = Vector2X<i32>;
pub type Vector2U = Vector2X<u32>;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vector2X<T> {
    pub x: T,
    pub y: T,
}

pub type Rect2F = Rect2X<f32>;
pub type Rect2I = Rect2X<i32>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rect2X<T> {
    pub pos: Vector2X<T>,
    pub size: Vector2X<T>,
}

impl<T: std::fmt::Display> std::fmt::Display for Vector2X<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

impl<T> Vector2X<T>
where
    T: Default
{
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: T::default(), y: T::default() }
    }
}

impl<T> From<(T, T)> for Vector2X<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

impl<T> std::ops::Add for Vector2X<T>
where
    T: std::ops::Add<Output = T>
{
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y
        }
    }
}

impl<T> std::ops::Sub for Vector2X<T>
where
    T: std::ops::Sub<Output = T>
{
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: T::sub(self.x, rhs.x),
            y: T::sub(self.y, rhs.y)
        }
    }
}

impl From<Vector2X<i32>> for Vector2X<f32> {
    fn from(value: Vector2X<i32>) -> Self {
        Self { x: value.x as f32, y: value.y as f32 }
    }
}

impl<T> Rect2X<T> {
    pub fn new(x: T, y: T, w: T, h: T) -> Self {
        Self { pos: Vector2X { x, y }, size: Vector2X { x: w, y: h } }
    }
}

impl From<Rect2X<i32>> for Rect2X<f32> {
    fn from(value: Rect2X<i32>) -> Self {
        Self { pos: value.pos.into(), size: value.size.into() }
    }
}

#[test]
fn test_vector_from_tuple() {
    let v1 = Vector2I::from((128, 256));
    assert_eq!(v1, Vector2I::new(128, 256));
}

#[test]
fn test_vector_add_sub() {
    let v1 = Vector2I::new(1, 2);
    let v2 = Vector2I::new(10, 20);
    assert_eq!(v1 + v2, Vector2I::new(11, 22));
    assert_eq!(v2 - v1, Vector2I::new(9, 18));
}

#[test]
fn test_rect_casting() {
    let rect = Rect2F::from(Rect2I::new(128, -256, 128, 128));
    assert_eq!(rect, Rect2F::new(128.0, -256.0, 128.0, 128.0));
}

#[test]
fn test_vector_casting() {
    let v1 = Vector2I::new(-3, 7);
    let v1_cast_f32 = Vector2F::from(v1);
    assert_eq!(v1_cast_f32, Vector2F::new(-3.0, 7.0));
}
