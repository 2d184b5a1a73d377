#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use bmp280_core::{Address, Bmp280, Config, Preset, Standby};
use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{AnyPin, Level, Output, OutputConfig},
    i2c::master::{AnyI2c, Config as I2cConfig, I2c},
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_println as _;
use esp32s3_baro::{console::Console, rhythm::Rhythm};

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

const SAMPLE_PERIOD: Duration = Duration::from_millis(200);
const INIT_RETRY_PERIOD: Duration = Duration::from_secs(1);

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let console: &'static Console = mk_static!(Console, Console::new());

    spawner
        .spawn(sample_sensor(
            peripherals.GPIO21.into(),
            peripherals.GPIO20.into(),
            peripherals.I2C0.into(),
            console,
        ))
        .ok();

    let led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    spawner.spawn(blink_led(led, console)).ok();

    loop {
        Timer::after_secs(1).await;
    }
}

/// Samples the BMP280 every [`SAMPLE_PERIOD`] in forced mode and reports
/// pressure and temperature on the console.
#[embassy_executor::task]
async fn sample_sensor(
    sda_pin: AnyPin<'static>,
    scl_pin: AnyPin<'static>,
    i2c: AnyI2c<'static>,
    console: &'static Console,
) {
    info!("'sample_sensor' has been started");

    let cfg = I2cConfig::default().with_frequency(Rate::from_khz(100));
    let i2c = match I2c::new(i2c, cfg) {
        Ok(i2c) => i2c.with_sda(sda_pin).with_scl(scl_pin),
        Err(_) => {
            console.print("I2C configuration rejected").await;
            return;
        }
    };

    let mut sensor = Bmp280::new(i2c, Delay::new(), Address::SdoGnd);
    let sensor_cfg = Config::preset(Preset::Weather, Standby::Ms0_5);

    loop {
        if !sensor.is_ready() {
            if let Err(e) = sensor.init(sensor_cfg) {
                console
                    .print(format_args!("BMP280 initialization failed: {}", e))
                    .await;
                Timer::after(INIT_RETRY_PERIOD).await;
                continue;
            }
            info!("BMP280 has been initialized");
        }

        match sensor.wake().and_then(|_| sensor.measure()) {
            Ok(measurement) => console.print(measurement).await,
            Err(e) => {
                console
                    .print(format_args!("BMP280 measurement failed: {}", e))
                    .await
            }
        }

        Timer::after(SAMPLE_PERIOD).await;
    }
}

/// Blinks the status LED in a three-fast, three-slow rhythm.
#[embassy_executor::task]
async fn blink_led(mut led: Output<'static>, console: &'static Console) {
    console.print("LED rhythm started").await;
    for pause in Rhythm::new() {
        led.toggle();
        Timer::after(pause).await;
    }
}
