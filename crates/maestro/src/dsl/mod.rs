//! The authoring DSL.
//!
//! Call these functions inside [`crate::TestContext::at_page`] (or any other
//! capture scope). Each call resolves its target right away and enqueues one
//! deferred command; outside a capture scope they fail with
//! [`crate::MaestroError::UninitializedEngine`].
//!
//! - [`actions`]: navigation, clicks, typing, waits, `save_result_as`
//! - [`expect`](mod@expect): element and context expectations
//! - [`flow`]: `step`, `when` and friends

pub mod actions;
pub mod expect;
pub mod flow;

pub use actions::{
    click_on, double_click_on, enter, goto, hover_over, press_backspace_on, press_enter_on,
    press_escape_on, press_key_on, save_result_as, wait_for_function, wait_until_url_is,
    EnterText,
};
pub use expect::{
    expect, expect_context, normalize_whitespace, ContextExpectation, ElementExpectation,
    TextMatcher,
};
pub use flow::{step, when, when_async, when_context_equals, StepFn, WHEN_LABEL};
