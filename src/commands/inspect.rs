use anyhow::{Context, Result};
use chrono::Utc;

use reelsync::config::Config;
use reelsync::listing::StaticListingSource;
use reelsync::models::{to_datetime, EpochMillis, Program};
use reelsync::schedule::{ScheduleWindowGenerator, TimeWindow};

use super::hours_ms;

/// Options of the `generate` command
pub struct GenerateParams {
    pub channel: i64,
    /// Window start in epoch milliseconds, defaults to now
    pub from: Option<EpochMillis>,
    pub hours: u64,
    pub json: bool,
}

/// Print the programs a channel would get over a window, without touching the store
pub fn generate(config: Config, params: GenerateParams) -> Result<()> {
    let listing = StaticListingSource::from_json_file(&config.listing.path)
        .context("Failed to load listing")?;
    let channel = listing.channel(params.channel)?;
    let reel = listing.reel(params.channel)?;

    let start = params.from.unwrap_or_else(|| Utc::now().timestamp_millis());
    let window = TimeWindow::starting_at(start, hours_ms(params.hours))?;

    let programs = ScheduleWindowGenerator::new().generate(
        channel.id,
        reel,
        channel.repeatable,
        window,
    )?;

    if params.json {
        println!("{}", serde_json::to_string_pretty(&programs)?);
        return Ok(());
    }

    println!(
        "Channel {} ({}) {}",
        channel.id,
        channel.display_name,
        if channel.repeatable { "[looping]" } else { "" }
    );
    println!("Window: {window}");
    println!("================================");
    for program in &programs {
        print_program(program);
    }
    println!("\n{} program(s)", programs.len());
    Ok(())
}

/// Print the program airing on a channel at `at` (defaults to now)
pub fn now_playing(config: Config, channel_id: i64, at: Option<EpochMillis>) -> Result<()> {
    let listing = StaticListingSource::from_json_file(&config.listing.path)
        .context("Failed to load listing")?;
    let channel = listing.channel(channel_id)?;
    let reel = listing.reel(channel_id)?;
    let at = at.unwrap_or_else(|| Utc::now().timestamp_millis());

    let current =
        ScheduleWindowGenerator::new().program_at(channel.id, reel, channel.repeatable, at)?;

    match current {
        Some(program) => print_program(&program),
        None => println!("Nothing airing on channel {channel_id} at {}", format_ms(at)),
    }
    Ok(())
}

fn print_program(program: &Program) {
    println!(
        "{} - {}  {}",
        format_ms(program.start_time_ms),
        format_ms(program.end_time_ms),
        program.title
    );
    if let Some(episode) = &program.episode_title {
        println!("    Episode: {episode}");
    }
    match program.advertisements() {
        Ok(ads) if !ads.is_empty() => {
            for ad in ads {
                println!(
                    "    Ad {} - {}",
                    format_ms(ad.start_ms),
                    format_ms(ad.stop_ms)
                );
            }
        }
        Ok(_) => {}
        Err(e) => println!("    Provider data unreadable: {e}"),
    }
}

fn format_ms(millis: EpochMillis) -> String {
    to_datetime(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}
