//! Operator buttons.
//!
//! Each falling edge steps the FSM synchronously with the latest
//! sensor snapshot — the press reacts immediately rather than waiting
//! for the next foreground cycle.

use embassy_executor::task;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::peripherals::{PA0, PA2};

use crate::tasks::{step_fsm, ActuatorsShared};

#[task]
pub async fn start_button_task(
    mut button: ExtiInput<'static, PA0>,
    actuators: &'static ActuatorsShared,
) {
    loop {
        button.wait_for_falling_edge().await;
        step_fsm(true, false, actuators);
    }
}

#[task]
pub async fn stop_button_task(
    mut button: ExtiInput<'static, PA2>,
    actuators: &'static ActuatorsShared,
) {
    loop {
        button.wait_for_falling_edge().await;
        step_fsm(false, true, actuators);
    }
}
