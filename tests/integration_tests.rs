use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc
    },
    time::{Duration, Instant}
};

use tiny_valley::{
    app::{GameView, LifecycleState, TouchEvent},
    config::GameConfig,
    game::{
        building::BuildingStyle,
        grid_map::{GridMap, CELL_SIZE},
        math::Vector2I,
        town::lock_town
    },
    rendering::recorder::{DrawCommand, RecordingSurface}
};

#[test]
fn test_taps_place_one_building_each_at_snapped_cell() {
    let view: GameView<RecordingSurface> = GameView::new(GameConfig::default());
    let taps = [
        (130.0, 5.0),
        (0.0, 0.0),
        (255.9, 256.0),
        (700.3, 1900.0),
        (130.0, 5.0),
    ];

    for (x, y) in taps {
        assert!(view.on_touch_event(&TouchEvent::down(x, y)));
    }

    let town = view.town();
    let town = lock_town(&town);
    assert_eq!(town.len(), taps.len());

    for (building, (x, y)) in town.iter_buildings().zip(taps) {
        assert_eq!(building.position(), Vector2I::from(GridMap::snap(x, y)));
    }
}

#[test]
fn test_taps_while_running_show_up_in_frames() {
    let surface = RecordingSurface::new(512, 512);
    let frame_log = surface.log();

    let mut view = GameView::new(GameConfig::default());
    view.surface_created(surface).unwrap();
    view.resume().unwrap();

    view.on_touch_event(&TouchEvent::down(10.0, 10.0));
    view.on_touch_event(&TouchEvent::down(300.0, 400.0));

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut rects = vec![];
    while Instant::now() < deadline {
        rects = frame_log.last_frame().into_iter()
            .filter_map(|command| match command {
                DrawCommand::RoundRect { rect, .. } => Some((rect.pos.x as i32, rect.pos.y as i32)),
                _ => None,
            })
            .collect();
        if rects.len() == 2 {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(rects, vec![(0, 0), (256, 384)]);

    view.pause();
    assert_eq!(view.state(), LifecycleState::Paused);
    assert!(view.surface_destroyed().is_some());
}

#[test]
fn test_concurrent_append_and_iterate() {
    let view: GameView<RecordingSurface> = GameView::new(GameConfig::default());
    let town = view.town();
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let town = town.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut placed = 0usize;
            while !stop.load(Ordering::Acquire) && placed < 50_000 {
                let x = (placed % 16) as f32 * 67.0;
                let y = (placed / 16 % 16) as f32 * 91.0;
                lock_town(&town).place_building(x, y, BuildingStyle::default());
                placed += 1;
            }
            placed
        })
    };

    let reader = {
        let town = town.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut passes = 0usize;
            while !stop.load(Ordering::Acquire) {
                let mut guard = lock_town(&town);
                guard.update(0.016);
                let aligned = guard.iter_buildings().all(|b| {
                    let position = b.position();
                    position.x % CELL_SIZE == 0 && position.y % CELL_SIZE == 0
                });
                assert!(aligned);
                passes += 1;
            }
            passes
        })
    };

    std::thread::sleep(Duration::from_millis(200));
    stop.store(true, Ordering::Release);

    let placed = writer.join().unwrap();
    let passes = reader.join().unwrap();

    assert!(passes > 0);
    assert_eq!(view.building_count(), placed);
}

#[test]
fn test_taps_from_other_thread_while_loop_runs() {
    let mut view = GameView::new(GameConfig::default());
    view.surface_created(RecordingSurface::new(1080, 1920)).unwrap();
    view.resume().unwrap();

    let view = Arc::new(std::sync::Mutex::new(view));
    let tapper = {
        let view = view.clone();
        std::thread::spawn(move || {
            for i in 0..100 {
                let view = view.lock().unwrap();
                view.on_touch_event(&TouchEvent::down((i * 10) as f32, (i * 19) as f32));
            }
        })
    };
    tapper.join().unwrap();

    let mut view = view.lock().unwrap();
    assert_eq!(view.building_count(), 100);
    view.pause();
    view.resume().unwrap();
    view.resume().unwrap();
    assert!(view.is_running());
    view.pause();
    assert!(!view.is_running());
}
