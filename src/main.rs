//! AirU node firmware (nRF52840 + SoftDevice S140).
//!
//! Task layout:
//!   - thread executor: SoftDevice event loop, BLE peripheral, telemetry
//!     cycle. Sensor polls await DMA and timers and are each bounded by
//!     a timeout, so BLE events keep flowing during a cycle.
//!   - interrupt executor on EGU0_SWI0: the watchdog, so it preempts the
//!     thread executor whatever state it is in

#![no_std]
#![no_main]

mod ble;
mod drivers;

use airu_node::config::{HDC1080_POLL_TIMEOUT_MS, PMS_POLL_TIMEOUT_MS};
use airu_node::sensors::hdc1080::Hdc1080;
use airu_node::{
    format_address, DeviceIdentity, LogUplink, Monotonic, NotificationGate,
    NotificationPublisher, Restart, TelemetryCycle, Watchdog,
};
use cortex_m::peripheral::SCB;
use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::uarte::{self, Uarte};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Delay, Instant};
use nrf_softdevice::Softdevice;
use panic_probe as _;
use static_cell::StaticCell;

use crate::ble::{AirQualityServer, SoftdeviceNotifier, CONNECTION};
use crate::drivers::pms::Pms5003;
use crate::drivers::timeout::Bounded;

bind_interrupts!(struct Irqs {
    UARTE0 => uarte::InterruptHandler<peripherals::UARTE0>;
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static WATCHDOG_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn EGU0_SWI0() {
    WATCHDOG_EXECUTOR.on_interrupt()
}

static GATE: NotificationGate = NotificationGate::new();
static IDENTITY: StaticCell<DeviceIdentity> = StaticCell::new();
static SERVER: StaticCell<AirQualityServer> = StaticCell::new();

/// Milliseconds since boot, from the embassy time driver.
struct Uptime;

impl Monotonic for Uptime {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

struct SystemReset;

impl Restart for SystemReset {
    fn restart(&mut self) -> ! {
        SCB::sys_reset()
    }
}

type Cycle = TelemetryCycle<
    'static,
    Bounded<Pms5003<'static>>,
    Bounded<Hdc1080<Twim<'static, TWISPI0>, Delay>>,
    SoftdeviceNotifier,
    LogUplink,
>;

#[embassy_executor::task]
async fn telemetry_task(mut cycle: Cycle) -> ! {
    cycle.run(&Uptime, &mut Delay).await
}

#[embassy_executor::task]
async fn watchdog_task(watchdog: Watchdog) -> ! {
    watchdog.run(&Uptime, &mut Delay, &mut SystemReset).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("AirU node v{} starting", env!("CARGO_PKG_VERSION"));

    // Keep HAL interrupts clear of the priorities the SoftDevice reserves.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    // Armed first: nothing below may delay it.
    interrupt::EGU0_SWI0.set_priority(Priority::P3);
    let watchdog_spawner = WATCHDOG_EXECUTOR.start(interrupt::EGU0_SWI0);
    unwrap!(watchdog_spawner.spawn(watchdog_task(Watchdog::arm(Uptime.now_ms()))));

    let sd = ble::enable_softdevice();
    let address = format_address(nrf_softdevice::ble::get_address(sd).bytes());
    let identity: &'static DeviceIdentity = IDENTITY.init(unwrap!(DeviceIdentity::new(
        address.as_str(),
        env!("CARGO_PKG_VERSION")
    )));
    info!("Device address {}", identity.address());

    let server: &'static AirQualityServer =
        SERVER.init(unwrap!(AirQualityServer::register(sd, identity)));
    let sd: &'static Softdevice = sd;

    // Sensors
    let mut uart_config = uarte::Config::default();
    uart_config.baudrate = uarte::Baudrate::BAUD9600;
    uart_config.parity = uarte::Parity::EXCLUDED;
    let pms = Pms5003::new(Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_config));

    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut hdc = Hdc1080::new(i2c, Delay);
    if let Err(e) = hdc.init().await {
        warn!("HDC1080 init failed: {}", e);
    }

    let cycle = TelemetryCycle::new(
        Bounded::new(pms, PMS_POLL_TIMEOUT_MS),
        Bounded::new(hdc, HDC1080_POLL_TIMEOUT_MS),
        NotificationPublisher::new(SoftdeviceNotifier::new(sd, &CONNECTION), server.table()),
        LogUplink::new(),
        identity,
        &GATE,
    );

    unwrap!(spawner.spawn(ble::softdevice_task(sd)));
    unwrap!(spawner.spawn(ble::peripheral_task(sd, server, &GATE)));
    unwrap!(spawner.spawn(telemetry_task(cycle)));
}
