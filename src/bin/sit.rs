//! # sit: 터미널 명상 타이머
//!
//! 웹 페이지와 같은 세션 코어를 터미널에서 구동합니다.
//!
//! 흐름:
//! 1. 세션 길이와 안내문 출력, Enter로 시작
//! 2. 세션 중에는 "여기 머문 시간"만 분 단위로 출력
//! 3. 시간이 다 되면 터미널 벨이 울리고, Enter를 누를 때까지 매 분 다시 울림
//! 4. Enter로 끝내면 처음으로 돌아가거나 `q`로 종료
//!
//! 로그는 stderr로 나가므로 화면 출력(stdout)과 섞이지 않습니다.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use goyo::{
    config::Config,
    session::{
        presence_message, MonotonicClock, SessionController, SessionEvent, SessionRunner,
        TerminalBell, UnsupportedWakeLock,
    },
};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::error::RecvError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "sit",
    version,
    about = "Relax here for a while. A chime marks the end, and every minute after."
)]
struct Args {
    /// Session length in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(i64).range(1..=999),
        conflicts_with = "seconds"
    )]
    minutes: Option<i64>,

    /// Session length in seconds
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..))]
    seconds: Option<i64>,
}

impl Args {
    fn duration_seconds(&self, config: &Config) -> i64 {
        match (self.minutes, self.seconds) {
            (Some(minutes), _) => minutes * 60,
            (None, Some(seconds)) => seconds,
            (None, None) => config.default_duration_seconds,
        }
    }
}

type Input = Lines<BufReader<Stdin>>;

enum Outcome {
    Finished,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goyo=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let controller = SessionController::from_config(
        &config,
        Arc::new(MonotonicClock::new()),
        Arc::new(TerminalBell::new()),
        Arc::new(UnsupportedWakeLock),
    )?;
    let runner = SessionRunner::new(controller, config.tick_interval);
    runner.configure(args.duration_seconds(&config)).await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let snapshot = runner.snapshot().await;
        print_setup(snapshot.duration_seconds);
        if !wait_for_enter(&mut input).await? {
            break;
        }

        runner.start().await?;
        let outcome = run_session(&runner, &mut input).await?;

        if let Outcome::Quit = outcome {
            if let Err(err) = runner.finish().await {
                tracing::debug!("Session was not running at quit: {err}");
            }
            break;
        }

        println!();
        println!("Thanks! Come again any time.");
        println!("Press Enter to go back to start, or type q to quit.");
        if !wait_for_enter(&mut input).await? {
            break;
        }
        runner.restart().await?;
    }

    Ok(())
}

fn print_setup(duration_seconds: i64) {
    println!();
    println!("I want to relax here for {}.", describe_duration(duration_seconds));
    println!("(relax, and do nothing)");
    println!();
    println!("Don't rush to get up.");
    println!(
        "I'll chime to let you know that the timer has expired and every minute after that, \
         so you don't lose track of time."
    );
    println!("Enjoy.");
    println!();
    println!("Press Enter to start, or type q to quit.");
}

fn describe_duration(seconds: i64) -> String {
    match (seconds / 60, seconds % 60) {
        (1, 0) => "1 minute".to_string(),
        (minutes, 0) => format!("{minutes} minutes"),
        (_, _) if seconds == 1 => "1 second".to_string(),
        _ => format!("{seconds} seconds"),
    }
}

/// Enter를 기다립니다. `q`, 입력 종료(EOF), Ctrl+C면 false
async fn wait_for_enter(input: &mut Input) -> Result<bool> {
    tokio::select! {
        line = input.next_line() => Ok(matches!(
            line?,
            Some(line) if !line.trim().eq_ignore_ascii_case("q")
        )),
        _ = tokio::signal::ctrl_c() => Ok(false),
    }
}

async fn run_session(runner: &SessionRunner, input: &mut Input) -> Result<Outcome> {
    let mut events = runner.subscribe().await;
    let mut refresh = tokio::time::interval(Duration::from_secs(1));
    let mut last_message = String::new();

    println!();
    println!("(You can stop looking at the screen for now.)");
    println!("Press Enter to finish early.");

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                let snapshot = runner.snapshot().await;
                let message = presence_message(snapshot.elapsed_seconds);
                if message != last_message {
                    println!("{message}");
                    last_message = message;
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::TimeUp) => {
                    println!("Time is up. Stay as long as you like, then press Enter to finish.");
                }
                Ok(SessionEvent::Chime { reason }) => tracing::debug!(?reason, "Chimed"),
                Ok(SessionEvent::StateChanged { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed session events");
                }
                Err(RecvError::Closed) => return Ok(Outcome::Quit),
            },
            line = input.next_line() => {
                return match line? {
                    Some(line) if line.trim().eq_ignore_ascii_case("q") => Ok(Outcome::Quit),
                    Some(_) => {
                        finish_session(runner).await?;
                        Ok(Outcome::Finished)
                    }
                    None => Ok(Outcome::Quit),
                };
            }
            _ = tokio::signal::ctrl_c() => return Ok(Outcome::Quit),
        }
    }
}

/// 세션을 끝냅니다. 시간이 이미 다 됐다면 일반 종료가 됩니다.
async fn finish_session(runner: &SessionRunner) -> Result<()> {
    let snapshot = runner.finish_early().await?;
    println!("{}", presence_message(snapshot.elapsed_seconds));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_read_naturally() {
        assert_eq!(describe_duration(60), "1 minute");
        assert_eq!(describe_duration(1_200), "20 minutes");
        assert_eq!(describe_duration(90), "90 seconds");
        assert_eq!(describe_duration(1), "1 second");
    }

    #[test]
    fn minutes_take_precedence_over_config_default() {
        let config = Config::default();
        let args = Args::parse_from(["sit", "--minutes", "5"]);
        assert_eq!(args.duration_seconds(&config), 300);

        let args = Args::parse_from(["sit", "-s", "42"]);
        assert_eq!(args.duration_seconds(&config), 42);

        let args = Args::parse_from(["sit"]);
        assert_eq!(args.duration_seconds(&config), 60);
    }

    #[test]
    fn out_of_range_minutes_are_rejected() {
        assert!(Args::try_parse_from(["sit", "--minutes", "0"]).is_err());
        assert!(Args::try_parse_from(["sit", "--minutes", "1000"]).is_err());
        assert!(Args::try_parse_from(["sit", "-m", "5", "-s", "5"]).is_err());
    }
}
