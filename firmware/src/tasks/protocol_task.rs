//! Serial protocol processing task.
//!
//! Owns UART0, the byte accumulator and the four bin servos. Each loop
//! pass pulls whatever bytes arrived, drains every complete message from
//! the accumulator, executes it and acknowledges it.
//!
//! Command execution blocks this task: while a dispense runs, incoming
//! bytes sit in the UART RX FIFO and are only pulled on the next pass, so
//! a long command combined with a fast sender can lose input at the
//! transport. Known limitation of the single-loop design, kept on
//! purpose.
use crate::config::{
    CHANNEL_NAMES, IDLE_DELAY_MS, POLL_TIMEOUT_MS, READ_CHUNK_SIZE, RX_ACCUMULATOR_CAPACITY,
    SERVO_FREQ_HZ,
};
use dispenser_core::motion::dispatch::{self, MotionProfile};
use dispenser_core::motion::servo::Servo;
use dispenser_core::protocol::accumulator::RxAccumulator;
use dispenser_core::protocol::ack::{self, Protocol, Status};
use dispenser_core::protocol::demux::{next_message, Message};
use dispenser_core::{Bin, ChannelCounts, CHANNEL_COUNT};
use embassy_time::{with_timeout, Delay, Duration, Timer};
use embedded_hal::pwm::SetDutyCycle;
use embedded_io_async::{Read, Write};
use esp_hal::gpio::AnyPin;
use esp_hal::ledc::channel::{self, Channel, ChannelIFace, Number};
use esp_hal::ledc::timer::{self, LSClockSource, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::LEDC;
use esp_hal::time::Rate;
use esp_hal::uart::Uart;
use esp_hal::Async;
use fugit::HertzU32;
use log::{error, info, warn};
use static_cell::StaticCell;

static LEDC_CELL: StaticCell<Ledc<'static>> = StaticCell::new();
static TIMER_CELL: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();

/// Configures the LEDC timer and one PWM channel per bin.
fn setup_servos(
    ledc: LEDC<'static>,
    servo_pins: [AnyPin<'static>; CHANNEL_COUNT],
) -> [Servo<Channel<'static, LowSpeed>>; CHANNEL_COUNT] {
    let ledc = LEDC_CELL.init(Ledc::new(ledc));
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let mut timer_low = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    timer_low
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty14Bit,
            clock_source: LSClockSource::APBClk,
            frequency: Rate::from_hz(SERVO_FREQ_HZ),
        })
        .expect("Fail configurating ledc timer");
    let timer_low = TIMER_CELL.init(timer_low);

    let [p0, p1, p2, p3] = servo_pins;
    let channels = [
        ledc.channel(Number::Channel0, p0),
        ledc.channel(Number::Channel1, p1),
        ledc.channel(Number::Channel2, p2),
        ledc.channel(Number::Channel3, p3),
    ];

    let mut bin = 0usize;
    channels.map(|mut ch| {
        ch.configure(channel::config::Config {
            timer: timer_low,
            duty_pct: 5,
            pin_config: channel::config::PinConfig::PushPull,
        })
        .expect("Fail configurating servo channel");
        let max_duty = ch.max_duty_cycle() as u32;
        let servo = Servo::new(ch, max_duty, HertzU32::from_raw(SERVO_FREQ_HZ), Bin::from(bin));
        bin += 1;
        servo
    })
}

#[embassy_executor::task]
pub async fn protocol_task(
    mut uart: Uart<'static, Async>,
    servo_pins: [AnyPin<'static>; CHANNEL_COUNT],
    ledc: LEDC<'static>,
) {
    info!("Starting protocol task");
    let mut servos = setup_servos(ledc, servo_pins);
    let mut rx: RxAccumulator<RX_ACCUMULATOR_CAPACITY> = RxAccumulator::new();
    let mut delay = Delay;
    let profile = MotionProfile::default();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let read = with_timeout(
            Duration::from_millis(POLL_TIMEOUT_MS),
            Read::read(&mut uart, &mut chunk),
        )
        .await;
        match read {
            Ok(Ok(n)) if n > 0 => rx.append(&chunk[..n]),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("[PROTOCOL_TASK] uart read error: {e:?}"),
            // Poll timeout with no traffic; fall through to the scan.
            Err(_) => {}
        }

        while let Some(message) = next_message(&mut rx, &CHANNEL_NAMES) {
            match message {
                Message::Dispense { counts, protocol } => {
                    info!(
                        "[PROTOCOL_TASK] dispense {counts:?} ({})",
                        protocol.as_str()
                    );
                    dispatch::execute(&mut servos, &counts, &mut delay, &profile).await;
                    send_ack(&mut uart, Status::Done, protocol, &counts).await;
                }
                Message::BadJson => {
                    warn!("[PROTOCOL_TASK] dropping unparseable line");
                    send_ack(
                        &mut uart,
                        Status::BadJson,
                        Protocol::JsonLine,
                        &[0; CHANNEL_COUNT],
                    )
                    .await;
                }
            }
        }

        Timer::after_millis(IDLE_DELAY_MS).await;
    }
}

async fn send_ack(
    uart: &mut Uart<'static, Async>,
    status: Status,
    protocol: Protocol,
    counts: &ChannelCounts,
) {
    match ack::encode(status, protocol, counts) {
        Ok(line) => {
            if let Err(e) = Write::write_all(uart, line.as_bytes()).await {
                error!("[PROTOCOL_TASK] uart write error: {e:?}");
            }
        }
        Err(e) => error!("[PROTOCOL_TASK] ack encoding failed: {e:?}"),
    }
}
