// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

use super::*;

#[test]
fn default_options_disable_output_and_never_expire() {
    let opts = PeOptions::default();
    assert_eq!(opts.expiration, ExpirationPolicy::Never);
    assert_eq!(opts.output, OutputPolicy::default());
    assert!(!opts.thread_safe);
    assert_eq!(opts.output.every_n_events, 0);
    assert_eq!(opts.output.interval, Duration::ZERO);
}

#[test]
fn builder_overrides_expiration_output_and_thread_safety() {
    let opts = PeOptions::new()
        .with_expiration(ExpirationPolicy::AfterIdle { idle: Duration::from_secs(30) })
        .with_output(OutputPolicy {
            every_n_events: 3,
            interval: Duration::from_millis(500),
            on_event: true,
        })
        .with_thread_safe(true);

    assert_eq!(opts.expiration, ExpirationPolicy::AfterIdle { idle: Duration::from_secs(30) });
    assert_eq!(opts.output.every_n_events, 3);
    assert_eq!(opts.output.interval, Duration::from_millis(500));
    assert!(opts.output.on_event);
    assert!(opts.thread_safe);
}

#[test]
fn count_due_fires_every_nth_event_and_never_at_zero() {
    let every_three = OutputPolicy { every_n_events: 3, ..OutputPolicy::default() };
    assert!(!every_three.count_due(1));
    assert!(!every_three.count_due(2));
    assert!(every_three.count_due(3));
    assert!(every_three.count_due(6));

    let disabled = OutputPolicy::default();
    assert!(!disabled.count_due(3));
    assert!(!disabled.count_due(0));
}

#[test]
fn timer_enabled_reflects_nonzero_interval() {
    assert!(!OutputPolicy::default().timer_enabled());
    let timed = OutputPolicy { interval: Duration::from_millis(50), ..OutputPolicy::default() };
    assert!(timed.timer_enabled());
}

#[test]
fn count_and_timer_triggers_are_independent() {
    let both = OutputPolicy {
        every_n_events: 2,
        interval: Duration::from_millis(10),
        on_event: false,
    };
    assert!(both.count_due(2));
    assert!(both.timer_enabled());
}
