#![no_std]
#![no_main]

mod board;
mod hw;
mod render;
mod shared;
mod tasks;

use core::cell::RefCell;
use core::sync::atomic::Ordering;

use embassy_executor::Spawner;
use embassy_stm32::adc::Adc;
use embassy_stm32::dma::NoDma;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pin, Pull, Speed};
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::{khz, Hertz};
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::CountingMode;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pov_core::clock::LocalClock;
use pov_core::hal::Watchdog;

use crate::board::Board;
use crate::hw::actuators::HwActuators;
use crate::hw::apa102::{self, Apa102Strip};
use crate::hw::time_source::BootTimeSource;
use crate::hw::watchdog::IwdgWatchdog;
use crate::tasks::buttons::{start_button_task, stop_button_task};
use crate::tasks::column::column_output_task;
use crate::tasks::foreground::foreground_task;
use crate::tasks::rotation::beam_break_task;
use crate::tasks::ActuatorsShared;

static ACTUATORS: StaticCell<ActuatorsShared> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // 1. Board init (168 MHz PLL)
    let board = Board::init();
    let p = board.p;

    // 2. SPI2 @ 4 MHz, TX only — APA102 column strip (SCK=PB13, MOSI=PB15)
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = Hertz(4_000_000);
    let spi = Spi::new_txonly(p.SPI2, p.PB13, p.PB15, NoDma, NoDma, spi_config);
    apa102::install(Apa102Strip::new(spi));

    // 3. Motor drive — TIM3 CH1 on PA6 @ 20 kHz
    let motor_pwm = SimplePwm::new(
        p.TIM3,
        Some(PwmPin::new_ch1(p.PA6, OutputType::PushPull)),
        None,
        None,
        None,
        khz(20),
        CountingMode::EdgeAlignedUp,
    );

    // 4. Audible cues — TIM4 CH1 on PB6, retuned per cue
    let tone_pwm = SimplePwm::new(
        p.TIM4,
        Some(PwmPin::new_ch1(p.PB6, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz(440),
        CountingMode::EdgeAlignedUp,
    );

    // 5. Status LED (PC13)
    let status_led = Output::new(p.PC13.degrade(), Level::Low, Speed::Low);

    let actuators: &'static ActuatorsShared = ACTUATORS.init(ActuatorsShared::new(
        RefCell::new(HwActuators::new(motor_pwm, tone_pwm, status_led)),
    ));

    // 6. Operator buttons (PA0 start, PA2 stop) and beam-break sensor (PB4)
    let start_button = ExtiInput::new(Input::new(p.PA0, Pull::Up), p.EXTI0);
    let stop_button = ExtiInput::new(Input::new(p.PA2, Pull::Up), p.EXTI2);
    let beam_break = ExtiInput::new(Input::new(p.PB4, Pull::Up), p.EXTI4);

    // 7. IR beacon detector (PB5, active low) — polled, not EXTI: it is
    //    sampled on the column clock so pulses land in column units
    let beacon = Input::new(p.PB5.degrade(), Pull::Up);

    // 8. Battery sense — ADC1 on PA1
    let adc = Adc::new(p.ADC1, &mut Delay);

    // 9. Wall clock: one blocking fetch at boot, then local ticks
    let mut time_source = BootTimeSource;
    let wall_clock = LocalClock::sync(&mut time_source, shared::now_micros_u64());

    // Anchor the stall detector so MOTOR_OFF does not look like an
    // immediately stalled rotor.
    shared::LAST_BEAM_BREAK_US.store(shared::now_micros(), Ordering::Relaxed);

    // 10. Watchdog last: everything that pets it must already be wired
    let mut watchdog = IwdgWatchdog::new(p.IWDG);
    watchdog.arm();

    defmt::info!("pov controller up");

    spawner
        .spawn(foreground_task(adc, p.PA1, actuators, wall_clock, watchdog))
        .unwrap();
    spawner.spawn(beam_break_task(beam_break)).unwrap();
    spawner.spawn(column_output_task(beacon)).unwrap();
    spawner.spawn(start_button_task(start_button, actuators)).unwrap();
    spawner.spawn(stop_button_task(stop_button, actuators)).unwrap();
}
