#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use core::future::pending;
use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{AnyPin, Pin};
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};
use log::info;
use pill_dispenser::config::UART_BAUD;
use pill_dispenser::tasks::protocol_task::protocol_task;

esp_bootloader_esp_idf::esp_app_desc!();

//BINS: [pill1, pill2, pill3, pill4]
//SERVO PINS: [18, 19, 21, 22]

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    // The USB-UART bridge shares UART0 with the command link, so keep
    // log output on a level the host-side parser tolerates.
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);

    let uart = Uart::new(p.UART0, UartConfig::default().with_baudrate(UART_BAUD))
        .expect("Fail configurating uart0")
        .with_tx(p.GPIO1)
        .with_rx(p.GPIO3)
        .into_async();

    let servo_pins: [AnyPin<'static>; 4] = [
        p.GPIO18.degrade(),
        p.GPIO19.degrade(),
        p.GPIO21.degrade(),
        p.GPIO22.degrade(),
    ];

    info!("Starting pill dispenser...");
    spawner
        .spawn(protocol_task(uart, servo_pins, p.LEDC))
        .expect("Fail spawning protocol task");

    loop {
        pending::<()>().await;
    }
}
