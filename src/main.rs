#![no_std]
#![no_main]

// Panic handler and debugging
use defmt::{unwrap, Debug2Format};

use defmt_rtt as _;
use panic_probe as _;

// Device
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    peripherals::{SPI2, TWISPI1},
    saadc::{self, ChannelConfig, Resolution, Saadc},
    spim,
    twim::{self, Twim},
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<TWISPI1>;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use wortuhr::{
    complication::{
        ActionHandle, ComplicationData, ComplicationHost, ComplicationInbox, TapError,
        WatchFaceId, COMPLICATION_ID,
    },
    config::WatchFaceConfig,
    engine::{timer::until_next_boundary, Engine, HostEvent, Mode},
    peripherals::{
        backlight::Backlight,
        battery::Battery,
        button::Button,
        display::{self, Lcd, LCD_H, LCD_W},
        touch::{Touch, TouchController},
    },
    system::{
        config::SystemConfig,
        time::{TimeManager, TimeReference},
    },
    ui::Canvas,
};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

const SYSTEM: SystemConfig = SystemConfig::new();

/// Wall clock, starting at the flashing time
static CLOCK: TimeManager = TimeManager::init(
    TimeReference::from_epoch_millis(UTC_TIME, 0),
    SYSTEM.timezone,
);

/// Inputs of the watch face task
enum FirmwareEvent {
    Host(HostEvent),
    Touch(Touch),
    ButtonPressed,
}

// Communication channels
static EVENTS: Channel<CriticalSectionRawMutex, FirmwareEvent, 8> = Channel::new();
static COMPLICATIONS: ComplicationInbox = ComplicationInbox::new();

static ENGINE: StaticCell<Engine<LoggingHost>> = StaticCell::new();

/// Complication services on a watch without a companion connection
struct LoggingHost;

impl ComplicationHost for LoggingHost {
    fn send_tap_action(&mut self, action: ActionHandle) -> Result<(), TapError> {
        defmt::warn!("No receiver for tap action {}", action);
        Err(TapError::Unreachable)
    }

    fn request_permission(&mut self, watch_face: WatchFaceId) {
        defmt::info!("Permission requested for {}", watch_face);
    }
}

/// Current UTC milliseconds
fn wall_clock() -> i64 {
    CLOCK.now_millis(Instant::now().as_millis())
}

/// Send a time tick on every full minute.
#[embassy_executor::task(pool_size = 1)]
async fn update_time() {
    loop {
        let delay = until_next_boundary(wall_clock(), 60_000);
        Timer::after(Duration::from_millis(delay as u64)).await;
        defmt::debug!("Time tick");
        EVENTS.send(FirmwareEvent::Host(HostEvent::TimeTick)).await;
    }
}

/// Fetch the battery status from the hardware.
#[embassy_executor::task(pool_size = 1)]
async fn update_battery_status(mut battery: Battery) {
    loop {
        match battery.update().await {
            Ok(true) => {
                if let Some(info) = battery.info() {
                    defmt::info!(
                        "Battery status: {}% {}mV ({})",
                        info.percent,
                        info.millivolts,
                        if info.charging {
                            "charging"
                        } else {
                            "discharging"
                        }
                    );

                    let mut buf = [0u8; 8];
                    let mut data = ComplicationData::ranged_value(info.percent as i32, 0, 100);
                    let text = format_no_std::show(&mut buf, format_args!("{}%", info.percent));
                    if let Ok(text) = text {
                        data = data.with_text(text);
                    }
                    // A full inbox is logged by the inbox itself
                    let _ = COMPLICATIONS.post((COMPLICATION_ID, data));

                    EVENTS
                        .send(FirmwareEvent::Host(HostEvent::BatteryChanged {
                            level: info.percent as i32,
                            scale: 100,
                        }))
                        .await;
                }
            }
            Ok(false) => {}
            Err(e) => defmt::warn!("Battery measurement failed: {}", e),
        }

        // Re-schedule the timer interrupt in 1s
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// Polls the button state every 10ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_button(mut button: Button) {
    loop {
        if button.pressed().await {
            defmt::debug!("Button pressed");
            EVENTS.send(FirmwareEvent::ButtonPressed).await;
        }

        // Re-schedule the timer interrupt in 10ms
        Timer::after(Duration::from_millis(10)).await;
    }
}

/// Polls the touch interrupt pin every 2ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_touch(mut touch: TouchController<TWISPI1>) {
    loop {
        if let Some(event) = touch.try_event_detected() {
            EVENTS.send(FirmwareEvent::Touch(event)).await;
        }

        // Re-schedule the timer interrupt in 2ms
        Timer::after(Duration::from_millis(2)).await;
    }
}

/// Drive the engine: feed it events, fire its timers and redraw on request.
#[embassy_executor::task(pool_size = 1)]
async fn watchface(
    engine: &'static mut Engine<LoggingHost>,
    mut canvas: Canvas<Lcd>,
    mut backlight: Backlight,
) {
    let now = wall_clock();
    engine.dispatch(
        HostEvent::SurfaceChanged {
            width: LCD_W as u32,
            height: LCD_H as u32,
        },
        now,
    );
    engine.dispatch(HostEvent::VisibilityChanged(true), now);

    let mut last_activity = Instant::now();
    let mut mode = engine.mode();

    loop {
        engine.drain_complications(&COMPLICATIONS);
        if engine.take_redraw() && engine.state().visible {
            if let Err(e) = engine.draw(&mut canvas, wall_clock()) {
                defmt::error!("Drawing failed: {}", Debug2Format(&e));
            }
        }

        // Sleep until the next timer, the ambient timeout or an event
        let now = wall_clock();
        let mut wait = engine
            .next_deadline()
            .map(|due| (due - now).max(0) as u64);
        if engine.mode() == Mode::ActiveTicking {
            let idle = SYSTEM
                .ambient_timeout_ms
                .saturating_sub(last_activity.elapsed().as_millis());
            wait = Some(wait.map_or(idle, |wait| wait.min(idle)));
        }
        let event = match wait {
            Some(ms) => with_timeout(Duration::from_millis(ms), EVENTS.receive())
                .await
                .ok(),
            None => Some(EVENTS.receive().await),
        };

        let now = wall_clock();
        match event {
            Some(FirmwareEvent::Host(event)) => engine.dispatch(event, now),
            Some(FirmwareEvent::Touch(touch)) => {
                last_activity = Instant::now();
                if engine.state().ambient {
                    // Waking up swallows the touch
                    engine.dispatch(HostEvent::AmbientModeChanged(false), now);
                } else {
                    engine.dispatch(
                        HostEvent::Tap {
                            kind: touch.kind,
                            x: touch.x,
                            y: touch.y,
                        },
                        now,
                    );
                }
            }
            Some(FirmwareEvent::ButtonPressed) => {
                last_activity = Instant::now();
                let visible = !engine.state().visible || engine.state().ambient;
                if engine.state().ambient {
                    engine.dispatch(HostEvent::AmbientModeChanged(false), now);
                }
                engine.dispatch(HostEvent::VisibilityChanged(visible), now);
            }
            None => {}
        }

        if engine.mode() == Mode::ActiveTicking
            && last_activity.elapsed().as_millis() >= SYSTEM.ambient_timeout_ms
        {
            engine.dispatch(HostEvent::AmbientModeChanged(true), now);
        }
        engine.poll(now);

        if engine.mode() != mode {
            mode = engine.mode();
            defmt::info!("Watch face mode: {}", mode);
            let result = match mode {
                Mode::ActiveTicking => backlight.set(SYSTEM.brightness_active),
                Mode::Ambient => backlight.set(SYSTEM.brightness_ambient),
                Mode::ActiveIdle => {
                    backlight.off();
                    Ok(())
                }
            };
            if let Err(e) = result {
                defmt::warn!("Backlight: {}", e);
            }
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(SYSTEM.nrf());
    defmt::info!("Initializing");

    // Initialize SAADC
    let mut saadc_config = saadc::Config::default();
    // Set resolution to 12bit, necessary for correct battery status calculation
    saadc_config.resolution = Resolution::_12BIT;
    // Pin P0.31: Voltage level
    let channel_config = ChannelConfig::single_ended(p.P0_31);
    let saadc = Saadc::new(p.SAADC, Irqs, saadc_config, [channel_config]);
    saadc.calibrate().await;

    // Initialize Backlight
    let backlight = unwrap!(Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        SYSTEM.brightness_active,
    ));

    // Initialize Battery
    let battery = Battery::init(Input::new(p.P0_12.degrade(), Pull::None), saadc);

    // Initialize Button
    let button = Button::init(
        Input::new(p.P0_13.degrade(), Pull::None),
        Output::new(p.P0_15.degrade(), Level::Low, OutputDrive::Standard),
    );

    // Initialize I2C
    let mut i2c_config = twim::Config::default();
    // Use I2C at 400KHz (the fastest clock available on the nRF52832),
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(p.TWISPI1, Irqs, p.P0_06, p.P0_07, i2c_config);

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;
    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let lcd = unwrap!(display::init(
        spim,
        Output::new(p.P0_25.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26.degrade(), Level::Low, OutputDrive::Standard),
    ));

    // Initialize touch controller
    let touch = TouchController::init(
        i2c,
        // Touchpad external interrupt pin: P0.28/AIN4 (TP_INT)
        Input::new(p.P0_28.degrade(), Pull::Up),
        // Touchpad reset pin: P0.10/NFC2 (TP_RESET)
        Output::new(p.P0_10.degrade(), Level::High, OutputDrive::Standard),
    );

    let config = WatchFaceConfig::default().with_utc_offset(CLOCK.utc_offset_secs());
    let engine = ENGINE.init(Engine::new(config, LoggingHost));

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(watchface(engine, Canvas::new(lcd), backlight)));
    unwrap!(spawner.spawn(poll_button(button)));
    unwrap!(spawner.spawn(poll_touch(touch)));
    unwrap!(spawner.spawn(update_battery_status(battery)));
    unwrap!(spawner.spawn(update_time()));
}
