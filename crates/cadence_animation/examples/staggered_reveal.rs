//! Staggered Reveal Demo
//!
//! Builds a small page-load sequence:
//! - a header block whose title and subtitle fade in together
//! - a list of cards revealed one by one, 80ms apart (options loaded from TOML)
//!
//! The outer group plays the two sections in sequence on a virtual clock and
//! prints each start and finish time.
//!
//! Run with: RUST_LOG=cadence_animation=debug cargo run -p cadence_animation --example staggered_reveal

use anyhow::Result;
use cadence_animation::{
    GroupAnimation, GroupEvent, GroupOptionsPatch, PlayType, SharedPlayable, TimedAnimation,
};
use cadence_core::TimerScheduler;
use std::rc::Rc;

const CARD_OPTIONS: &str = r#"
playType = "interval"
interval = 80
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let scheduler = TimerScheduler::new();
    let handle = scheduler.handle();

    let title = TimedAnimation::new(handle.clone(), 300.0);
    let subtitle = TimedAnimation::new(handle.clone(), 200.0);
    let header = GroupAnimation::with_options(
        handle.clone(),
        vec![title.clone().shared(), subtitle.clone().shared()],
        PlayType::Together,
    );

    let cards: Vec<TimedAnimation> = (0..4)
        .map(|_| TimedAnimation::new(handle.clone(), 250.0))
        .collect();
    let card_list = GroupAnimation::with_options(
        handle.clone(),
        cards.iter().cloned().map(TimedAnimation::shared).collect(),
        GroupOptionsPatch::from_toml_str(CARD_OPTIONS)?,
    );

    let header_child: SharedPlayable = Rc::new(header.clone());
    let cards_child: SharedPlayable = Rc::new(card_list.clone());
    let page = GroupAnimation::with_options(
        handle.clone(),
        vec![header_child, cards_child],
        PlayType::Sequential,
    );

    println!("header:  {:>6.1}ms", header.duration_ms()?);
    println!("cards:   {:>6.1}ms", card_list.duration_ms()?);
    println!("page:    {:>6.1}ms", page.duration_ms()?);

    let clock = handle.clone();
    page.subscribe(move |event| {
        if *event == GroupEvent::Complete {
            println!("page complete at {:.1}ms", clock.now_ms().unwrap_or_default());
        }
    })?;

    page.play()?;

    // Step like a 60Hz frame loop would
    while scheduler.has_pending() {
        scheduler.advance(1000.0 / 60.0);
        for (i, card) in cards.iter().enumerate() {
            if let Some(started) = card.started_at_ms() {
                tracing::debug!(card = i, started, progress = card.progress(), "card frame");
            }
        }
    }

    println!(
        "finished: page {:?}, title {:?}, last card {:?}",
        page.phase(),
        title.state(),
        cards.last().map(|card| card.state()),
    );

    page.dispose()?;
    Ok(())
}
