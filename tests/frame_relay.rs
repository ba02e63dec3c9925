mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use common::{MockHost, init_tracing};
use frame_relay::{
    ExternalVsync, FixedIntervalTicks, FrameError, FrameProducer, FrameTexture, InlineDispatcher,
    LifecycleState, PixelFormat, RefreshScheduler, TextureConfig, TextureRegistry, UiTaskQueue,
};

const RED: u32 = 0xFFFF_0000;

fn vsync_texture(host: &Arc<MockHost>, config: TextureConfig) -> (FrameTexture, Arc<ExternalVsync>) {
    let vsync = Arc::new(ExternalVsync::new());
    let texture = FrameTexture::create(
        config,
        host.clone(),
        vsync.clone(),
        Arc::new(InlineDispatcher),
    )
    .unwrap();
    (texture, vsync)
}

fn commit_solid(producer: &mut FrameProducer, argb: u32) -> u64 {
    let mut handle = producer.acquire_writable().unwrap();
    handle.fill_argb(argb);
    handle.commit().unwrap()
}

#[test]
fn first_frame_reaches_the_host_after_one_tick() {
    init_tracing();
    let host = MockHost::new();
    let (texture, vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    assert_eq!(texture.state(), LifecycleState::Active);
    assert_eq!(host.registered().len(), 1);

    let consumer = texture.consumer();
    assert!(consumer.copy_current().is_none());

    let mut producer = texture.take_producer().unwrap();
    assert_eq!(commit_solid(&mut producer, RED), 1);

    vsync.signal();
    assert_eq!(host.notifications(), 1);

    let view = consumer.copy_current().unwrap();
    assert_eq!(view.frame_seq(), 1);
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(view.pixel_argb(x, y), Some(RED));
        }
    }
    assert_eq!(&view.pixels()[..4], &[0x00, 0x00, 0xFF, 0xFF]);
}

#[test]
fn commits_between_ticks_coalesce_into_one_notification() {
    init_tracing();
    let host = MockHost::new();
    let (texture, vsync) = vsync_texture(&host, TextureConfig::new(4, 4));
    let mut producer = texture.take_producer().unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let consumer = texture.consumer();
        let seen = seen.clone();
        host.on_frame_available(move |_| {
            let view = consumer.copy_current().unwrap();
            assert_eq!(view.frame_seq(), 3);
            seen.lock()
                .unwrap()
                .push((view.frame_seq(), view.pixel_argb(3, 3)));
        });
    }

    for color in [0xFF00_0001, 0xFF00_0002, 0xFF00_0003] {
        commit_solid(&mut producer, color);
    }
    vsync.signal();
    vsync.signal();

    assert_eq!(host.notifications(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![(3, Some(0xFF00_0003))]);
}

#[test]
fn idle_ticks_never_notify() {
    init_tracing();
    let host = MockHost::new();
    let (texture, vsync) = vsync_texture(&host, TextureConfig::new(2, 2));

    for _ in 0..100 {
        vsync.signal();
    }
    assert_eq!(host.notifications(), 0);

    let mut producer = texture.take_producer().unwrap();
    commit_solid(&mut producer, RED);
    for _ in 0..100 {
        vsync.signal();
    }
    assert_eq!(host.notifications(), 1);
}

#[test]
fn commit_during_in_flight_notification_is_delivered_later() {
    init_tracing();
    let host = MockHost::new();
    let vsync = Arc::new(ExternalVsync::new());
    let queue = Arc::new(UiTaskQueue::new());
    let texture =
        FrameTexture::create(TextureConfig::new(2, 2), host.clone(), vsync.clone(), queue.clone())
            .unwrap();
    let mut producer = texture.take_producer().unwrap();

    commit_solid(&mut producer, 0xFF00_0001);
    vsync.signal();
    assert_eq!(queue.len(), 1);

    commit_solid(&mut producer, 0xFF00_0002);
    vsync.signal();
    assert_eq!(queue.len(), 1, "a second hand-off must not be queued while one is in flight");

    assert_eq!(queue.drain(), 1);
    assert_eq!(host.notifications(), 1);

    vsync.signal();
    assert_eq!(queue.drain(), 1);
    assert_eq!(host.notifications(), 2);

    vsync.signal();
    assert_eq!(queue.drain(), 0);
}

#[test]
fn dispose_rejects_outstanding_handle_without_freeing_it() {
    init_tracing();
    let host = MockHost::new();
    let (mut texture, vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    let texture_id = texture.texture_id();
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    let mut handle = producer.acquire_writable().unwrap();
    texture.dispose();
    assert_eq!(texture.state(), LifecycleState::Disposed);
    assert_eq!(host.unregistered(), vec![texture_id]);

    handle.fill_argb(RED);
    assert_eq!(handle.commit(), Err(FrameError::NotActive));

    vsync.signal();
    assert_eq!(host.notifications(), 0);
    assert!(consumer.copy_current().is_none());
    assert!(producer.acquire_writable().is_none());
    assert!(!producer.is_active());

    texture.dispose();
    drop(texture);
    assert_eq!(host.unregistered().len(), 1);
}

#[test]
fn zero_sized_texture_fails_without_registering() {
    init_tracing();
    let host = MockHost::new();
    let err = FrameTexture::create(
        TextureConfig::new(0, 4),
        host.clone(),
        Arc::new(ExternalVsync::new()),
        Arc::new(InlineDispatcher),
    )
    .err()
    .unwrap();

    assert!(matches!(err, FrameError::AllocationFailed { width: 0, height: 4, .. }));
    assert!(host.registered().is_empty());
}

#[test]
fn refused_registration_rolls_back() {
    init_tracing();
    let host = MockHost::refusing();
    let vsync = Arc::new(ExternalVsync::new());
    let result = FrameTexture::create(
        TextureConfig::new(2, 2),
        host.clone(),
        vsync.clone(),
        Arc::new(InlineDispatcher),
    );
    assert!(matches!(result, Err(FrameError::Registration(_))));

    // The tick source was never started, so it can still be used.
    let other = MockHost::new();
    assert!(
        FrameTexture::create(
            TextureConfig::new(2, 2),
            other,
            vsync,
            Arc::new(InlineDispatcher)
        )
        .is_ok()
    );
}

#[test]
fn failed_tick_start_unregisters_the_texture() {
    init_tracing();
    let host = MockHost::new();
    let vsync = Arc::new(ExternalVsync::new());
    let _first = FrameTexture::create(
        TextureConfig::new(2, 2),
        host.clone(),
        vsync.clone(),
        Arc::new(InlineDispatcher),
    )
    .unwrap();

    let result = FrameTexture::create(
        TextureConfig::new(2, 2),
        host.clone(),
        vsync,
        Arc::new(InlineDispatcher),
    );
    assert!(matches!(result, Err(FrameError::Registration(_))));

    let registered = host.registered();
    assert_eq!(registered.len(), 2);
    assert_eq!(host.unregistered(), vec![registered[1].0]);
}

#[test]
fn producer_can_be_taken_once() {
    let host = MockHost::new();
    let (texture, _vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    assert!(texture.take_producer().is_some());
    assert!(texture.take_producer().is_none());
}

#[test]
fn pinned_reader_makes_the_producer_drop_frames() {
    let host = MockHost::new();
    let (texture, _vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    commit_solid(&mut producer, 0xFF00_0001);
    let view = consumer.copy_current().unwrap();
    let pinned = view.index();

    commit_solid(&mut producer, 0xFF00_0002);
    assert!(producer.acquire_writable().is_none());
    assert_eq!(view.pixel_argb(0, 0), Some(0xFF00_0001));

    drop(view);
    let handle = producer.acquire_writable().unwrap();
    assert_eq!(handle.index(), pinned);
}

#[test]
fn triple_buffering_keeps_producing_while_a_reader_holds_a_frame() {
    let host = MockHost::new();
    let (texture, _vsync) =
        vsync_texture(&host, TextureConfig::new(2, 2).with_buffer_count(3));
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    commit_solid(&mut producer, 0xFF00_0001);
    let view = consumer.copy_current().unwrap();
    for n in 2..10 {
        assert_eq!(commit_solid(&mut producer, 0xFF00_0000 | n), u64::from(n));
    }
    assert_eq!(view.frame_seq(), 1);
    assert_eq!(view.pixel_argb(1, 1), Some(0xFF00_0001));
}

#[test]
fn write_frame_copies_rows_and_rejects_short_sources() {
    init_tracing();
    let host = MockHost::new();
    let (texture, _vsync) = vsync_texture(
        &host,
        TextureConfig::new(2, 2).with_format(PixelFormat::Rgba8888),
    );
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    // 2x2 source with 4 bytes of padding per row.
    let src: Vec<u8> = (0u8..24).collect();
    assert_eq!(producer.write_frame(&src, 12), Ok(Some(1)));
    let view = consumer.copy_current().unwrap();
    assert_eq!(view.row(0).unwrap(), &src[0..8]);
    assert_eq!(view.row(1).unwrap(), &src[12..20]);
    drop(view);

    assert!(matches!(
        producer.write_frame(&src[..10], 8),
        Err(FrameError::CopyFailed(_))
    ));
    assert!(matches!(
        producer.write_frame(&src, 4),
        Err(FrameError::CopyFailed(_))
    ));
    assert_eq!(consumer.current_info().unwrap().frame_seq, 1);
}

#[test]
fn failed_fill_drops_the_frame() {
    init_tracing();
    let host = MockHost::new();
    let (texture, vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    commit_solid(&mut producer, RED);
    vsync.signal();

    let result = producer.produce_with(|buf| {
        buf.fill_argb(0xFF00_FF00);
        Err("decoder stalled")
    });
    assert!(matches!(result, Err(FrameError::CopyFailed(ref msg)) if msg == "decoder stalled"));

    vsync.signal();
    assert_eq!(host.notifications(), 1);
    let view = consumer.copy_current().unwrap();
    assert_eq!(view.frame_seq(), 1);
    assert_eq!(view.pixel_argb(0, 0), Some(RED));
}

#[test]
fn copy_into_host_memory_clamps_to_the_smaller_pitch() {
    let host = MockHost::new();
    let (texture, _vsync) = vsync_texture(&host, TextureConfig::new(2, 3));
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    let mut empty = [0u8; 24];
    assert_eq!(consumer.copy_current_into(&mut empty, 8), 0);

    commit_solid(&mut producer, RED);

    let mut wide = vec![0xAAu8; 3 * 12];
    assert_eq!(consumer.copy_current_into(&mut wide, 12), 24);
    assert_eq!(&wide[0..4], &[0x00, 0x00, 0xFF, 0xFF]);
    assert_eq!(&wide[8..12], &[0xAA; 4]);

    let mut narrow = vec![0u8; 3 * 4];
    assert_eq!(consumer.copy_current_into(&mut narrow, 4), 12);

    let mut short = vec![0u8; 8 + 8];
    assert_eq!(consumer.copy_current_into(&mut short, 8), 16);

    let info = consumer.current_info().unwrap();
    assert_eq!((info.width, info.height, info.stride), (2, 3, 8));
    assert_eq!(info.format, PixelFormat::Bgra8888);
}

#[test]
fn oversized_strides_are_rejected_instead_of_overflowing() {
    init_tracing();
    let host = MockHost::new();
    let (texture, _vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    let mut producer = texture.take_producer().unwrap();
    let consumer = texture.consumer();

    let src = [0u8; 64];
    assert!(matches!(
        producer.write_frame(&src, usize::MAX),
        Err(FrameError::CopyFailed(_))
    ));
    assert!(consumer.current_info().is_none());

    commit_solid(&mut producer, RED);

    // Only the first row fits; the second row's offset overflows.
    let mut dst = [0u8; 64];
    assert_eq!(consumer.copy_current_into(&mut dst, usize::MAX), 8);
    assert_eq!(&dst[..4], &[0x00, 0x00, 0xFF, 0xFF]);
    assert_eq!(consumer.copy_current_into(&mut dst, usize::MAX / 2 + 1), 8);

    let registry = TextureRegistry::new(host.clone(), Arc::new(InlineDispatcher));
    registry
        .create(1, TextureConfig::new(2, 2), Arc::new(ExternalVsync::new()))
        .unwrap();
    assert!(matches!(
        registry.update(1, &src, usize::MAX),
        Err(FrameError::CopyFailed(_))
    ));
    assert_eq!(registry.update(1, &src, 8), Ok(Some(1)));
    assert_eq!(registry.copy(1, &mut dst, usize::MAX), 8);
}

#[test]
fn readers_never_observe_torn_frames() {
    init_tracing();
    let host = MockHost::new();
    let (texture, _vsync) = vsync_texture(&host, TextureConfig::new(64, 32));
    let mut producer = texture.take_producer().unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let consumer = texture.consumer();
            let done = done.clone();
            thread::spawn(move || {
                let mut last_seq = 0;
                let mut observed = 0usize;
                while !done.load(Ordering::Acquire) {
                    let Some(view) = consumer.copy_current() else {
                        continue;
                    };
                    let seq = view.frame_seq();
                    assert!(seq >= last_seq, "frame sequence went backwards");
                    last_seq = seq;

                    let expected = (seq as u32).to_le_bytes();
                    for px in view.pixels().chunks_exact(4) {
                        assert_eq!(px, expected, "torn frame {seq}");
                    }
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    let mut committed = 0;
    for _ in 0..2_000 {
        let next = committed + 1;
        if let Ok(Some(seq)) = producer.produce_with(|buf| {
            buf.fill_argb(next as u32);
            Ok::<(), &str>(())
        }) {
            committed = seq;
        }
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
    let view = texture.consumer().copy_current().unwrap();
    assert_eq!(view.frame_seq(), committed);
}

#[test]
fn dispose_from_inside_the_notification_does_not_deadlock() {
    init_tracing();
    let host = MockHost::new();
    let (texture, vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    let texture_id = texture.texture_id();
    let mut producer = texture.take_producer().unwrap();

    let slot = Arc::new(Mutex::new(Some(texture)));
    let hook_slot = slot.clone();
    host.on_frame_available(move |_| {
        let taken = hook_slot.lock().unwrap().take();
        drop(taken);
    });

    commit_solid(&mut producer, RED);
    vsync.signal();

    assert_eq!(host.notifications(), 1);
    assert!(slot.lock().unwrap().is_none());
    assert_eq!(host.unregistered(), vec![texture_id]);

    assert!(producer.acquire_writable().is_none());
    vsync.signal();
    assert_eq!(host.notifications(), 1);
}

#[test]
fn dispose_waits_for_a_notification_running_elsewhere() {
    init_tracing();
    let host = MockHost::new();
    let finished = Arc::new(AtomicBool::new(false));
    let (entered_tx, entered_rx) = mpsc::channel();
    {
        let finished = finished.clone();
        host.on_frame_available(move |_| {
            let _ = entered_tx.send(());
            thread::sleep(Duration::from_millis(50));
            finished.store(true, Ordering::SeqCst);
        });
    }

    let (mut texture, vsync) = vsync_texture(&host, TextureConfig::new(2, 2));
    let mut producer = texture.take_producer().unwrap();
    commit_solid(&mut producer, RED);

    let ticker = thread::spawn(move || vsync.signal());
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    texture.dispose();
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(host.unregistered().len(), 1);
    ticker.join().unwrap();
}

#[test]
fn queued_notification_is_dropped_after_dispose() {
    init_tracing();
    let host = MockHost::new();
    let vsync = Arc::new(ExternalVsync::new());
    let queue = Arc::new(UiTaskQueue::new());
    let mut texture =
        FrameTexture::create(TextureConfig::new(2, 2), host.clone(), vsync.clone(), queue.clone())
            .unwrap();
    let mut producer = texture.take_producer().unwrap();

    commit_solid(&mut producer, RED);
    vsync.signal();
    assert_eq!(queue.len(), 1);

    texture.dispose();
    assert_eq!(queue.drain(), 1);
    assert_eq!(host.notifications(), 0);
}

#[test]
fn no_notification_after_dispose_while_producing_and_ticking() {
    init_tracing();
    let host = MockHost::new();
    let (mut texture, vsync) = vsync_texture(&host, TextureConfig::new(16, 16));
    let mut producer = texture.take_producer().unwrap();
    let stop_ticks = Arc::new(AtomicBool::new(false));

    let producing = thread::spawn(move || {
        let mut committed = 0u64;
        while producer.is_active() {
            if let Some(mut handle) = producer.acquire_writable() {
                handle.fill_argb(0xFF00_0000 | (committed as u32 & 0xFF));
                if handle.commit().is_ok() {
                    committed += 1;
                }
            }
        }
        committed
    });

    let ticking = {
        let stop_ticks = stop_ticks.clone();
        thread::spawn(move || {
            while !stop_ticks.load(Ordering::Acquire) {
                vsync.signal();
                thread::yield_now();
            }
        })
    };

    assert!(host.wait_for_notifications(5, Duration::from_secs(5)));
    texture.dispose();
    let at_dispose = host.notifications();
    assert_eq!(host.unregistered(), vec![texture.texture_id()]);

    thread::sleep(Duration::from_millis(50));
    assert_eq!(host.notifications(), at_dispose);

    let committed = producing.join().unwrap();
    assert!(committed >= 5);
    stop_ticks.store(true, Ordering::Release);
    ticking.join().unwrap();
    assert_eq!(host.notifications(), at_dispose);
}

#[test]
fn fixed_interval_ticks_drive_notifications() {
    init_tracing();
    let host = MockHost::new();
    let scheduler = RefreshScheduler::new().unwrap();
    let ticks = Arc::new(FixedIntervalTicks::new(scheduler, 200));
    let texture = FrameTexture::create(
        TextureConfig::new(2, 2),
        host.clone(),
        ticks,
        Arc::new(InlineDispatcher),
    )
    .unwrap();
    let mut producer = texture.take_producer().unwrap();

    commit_solid(&mut producer, RED);
    assert!(host.wait_for_notifications(1, Duration::from_secs(5)));

    thread::sleep(Duration::from_millis(50));
    assert_eq!(host.notifications(), 1);

    commit_solid(&mut producer, 0xFF00_00FF);
    assert!(host.wait_for_notifications(2, Duration::from_secs(5)));

    drop(texture);
    assert!(producer.acquire_writable().is_none());
    thread::sleep(Duration::from_millis(30));
    assert_eq!(host.notifications(), 2);
}

#[test]
fn registry_replaces_updates_and_forgets_textures() {
    init_tracing();
    let host = MockHost::new();
    let registry = TextureRegistry::new(host.clone(), Arc::new(InlineDispatcher));

    let first = registry
        .create(7, TextureConfig::new(2, 2), Arc::new(ExternalVsync::new()))
        .unwrap();
    let second = registry
        .create(7, TextureConfig::new(2, 2), Arc::new(ExternalVsync::new()))
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(host.unregistered(), vec![first]);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.texture_id(7), Some(second));

    let src: Vec<u8> = (0u8..16).collect();
    assert_eq!(registry.update(7, &src, 8), Ok(Some(1)));
    let mut dst = [0u8; 16];
    assert_eq!(registry.copy(7, &mut dst, 8), 16);
    assert_eq!(&dst[..], &src[..]);

    let err = registry
        .create(7, TextureConfig::new(0, 2), Arc::new(ExternalVsync::new()))
        .unwrap_err();
    assert!(matches!(err, FrameError::AllocationFailed { .. }));
    assert!(!registry.contains(7));
    assert!(registry.texture_id(7).is_none());
    assert!(registry.consumer(7).is_none());
    assert_eq!(registry.copy(7, &mut dst, 8), 0);
    assert_eq!(registry.update(7, &src, 8), Err(FrameError::NotActive));
    assert_eq!(host.unregistered(), vec![first, second]);

    assert!(!registry.destroy(7));
    registry
        .create(9, TextureConfig::new(1, 1), Arc::new(ExternalVsync::new()))
        .unwrap();
    assert!(registry.destroy(9));
    assert!(registry.is_empty());
}

#[test]
fn registry_destroy_unregisters_before_returning_during_updates() {
    init_tracing();
    let host = MockHost::new();
    let registry = Arc::new(TextureRegistry::new(host.clone(), Arc::new(InlineDispatcher)));
    let vsync = Arc::new(ExternalVsync::new());
    let texture_id = registry
        .create(1, TextureConfig::new(512, 512), vsync.clone())
        .unwrap();

    let (started_tx, started_rx) = mpsc::channel();
    let updating = {
        let registry = registry.clone();
        thread::spawn(move || {
            let src = vec![0x5Au8; 512 * 512 * 4];
            let mut updates = 0usize;
            loop {
                match registry.update(1, &src, 512 * 4) {
                    Ok(_) => {
                        updates += 1;
                        if updates == 1 {
                            let _ = started_tx.send(());
                        }
                    }
                    Err(err) => {
                        assert_eq!(err, FrameError::NotActive);
                        return updates;
                    }
                }
            }
        })
    };

    let stop_ticks = Arc::new(AtomicBool::new(false));
    let ticking = {
        let stop_ticks = stop_ticks.clone();
        thread::spawn(move || {
            while !stop_ticks.load(Ordering::Acquire) {
                vsync.signal();
                thread::yield_now();
            }
        })
    };

    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(registry.destroy(1));
    assert_eq!(host.unregistered(), vec![texture_id]);
    let at_destroy = host.notifications();

    assert!(updating.join().unwrap() >= 1);
    thread::sleep(Duration::from_millis(30));
    stop_ticks.store(true, Ordering::Release);
    ticking.join().unwrap();
    assert_eq!(host.notifications(), at_destroy);
    assert!(registry.consumer(1).is_none());
}

#[test]
fn dropping_the_registry_disposes_every_texture() {
    let host = MockHost::new();
    let registry = TextureRegistry::new(host.clone(), Arc::new(InlineDispatcher));
    for id in 0..3 {
        registry
            .create(id, TextureConfig::new(1, 1), Arc::new(ExternalVsync::new()))
            .unwrap();
    }
    drop(registry);
    assert_eq!(host.unregistered().len(), 3);
}
