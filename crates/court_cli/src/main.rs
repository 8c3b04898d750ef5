//! Court CLI
//!
//! Runs one seeded game (from a JSON request file or the demo rosters) or a
//! calibration batch. Log level comes from `RUST_LOG`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use court_core::api::{simulate_request, MatchRequest, MatchResponse, TeamPayload, SCHEMA_VERSION};
use court_core::models::{BoxScoreTeam, PlayByPlayEntry};
use court_core::test_fixtures::{demo_roster, demo_team};
use court_core::{run_batch, MatchConfig};

#[derive(Parser)]
#[command(name = "court")]
#[command(about = "Simulate basketball games", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one game and print the box score
    Simulate {
        /// MatchRequest JSON file; demo rosters when omitted
        #[arg(long)]
        request: Option<PathBuf>,

        /// Seed (overrides the request's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full play-by-play log
        #[arg(long, default_value = "false")]
        play_by_play: bool,

        /// Print only highlight plays
        #[arg(long, default_value = "false")]
        highlights: bool,

        /// Print the response as JSON instead of tables
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Simulate many demo games and print league averages
    Batch {
        #[arg(long, default_value = "100")]
        games: u32,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

const DEFAULT_SEED: u64 = 42;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { request, seed, play_by_play, highlights, json } => {
            let mut req = match request {
                Some(path) => load_request(&path)?,
                None => demo_request(DEFAULT_SEED),
            };
            if let Some(seed) = seed {
                req.seed = seed;
            }
            req.include_play_by_play = play_by_play || highlights;

            log::info!("simulating {} with seed {}", req.game_id, req.seed);
            let response = simulate_request(&req).context("simulation failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_game(&response, play_by_play);
            }
        }

        Commands::Batch { games, seed } => {
            let demo = demo_request(seed);
            let summary = run_batch(&demo.home_team, &demo.away_team, &MatchConfig::simulation(), games, seed)
                .context("batch failed")?;

            println!("Games:            {}", summary.games);
            println!("Home / away wins: {} / {}", summary.home_wins, summary.away_wins);
            println!("Overtime games:   {}", summary.overtime_games);
            println!("Points per team:  {:.1}", summary.points_per_team);
            println!("Possessions:      {:.1}", summary.possessions_per_team);
            println!("Avg margin:       {:.1}", summary.avg_margin);
            println!(
                "FG / 3P / FT:     {:.1}% / {:.1}% / {:.1}%",
                summary.fg_pct * 100.0,
                summary.three_pct * 100.0,
                summary.ft_pct * 100.0
            );
            println!("Rebounds:         {:.1}", summary.rebounds_per_team);
            println!("Assists:          {:.1}", summary.assists_per_team);
            println!("Turnovers:        {:.1}", summary.turnovers_per_team);
            println!("Fouls:            {:.1}", summary.fouls_per_team);
        }
    }

    Ok(())
}

fn load_request(path: &Path) -> Result<MatchRequest> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn demo_request(seed: u64) -> MatchRequest {
    MatchRequest {
        schema_version: SCHEMA_VERSION,
        seed,
        game_id: format!("demo-{seed}"),
        home_team: TeamPayload { info: demo_team("bos", "BOS"), players: demo_roster("BOS", 78) },
        away_team: TeamPayload { info: demo_team("nyk", "NYK"), players: demo_roster("NYK", 76) },
        include_play_by_play: false,
        config: None,
    }
}

fn print_game(response: &MatchResponse, play_by_play: bool) {
    if let Some(log) = &response.play_by_play {
        for entry in log.iter().filter(|e| play_by_play || e.is_important) {
            print_entry(entry);
        }
        println!();
    }

    let home = &response.box_score.home;
    let away = &response.box_score.away;
    let ot = response.periods.saturating_sub(4);
    println!(
        "FINAL{}  {} {}  -  {} {}  (seed {}, {} possessions)",
        if ot > 0 { format!(" ({ot}OT)") } else { String::new() },
        home.name,
        response.home_score,
        response.away_score,
        away.name,
        response.seed,
        response.possessions
    );
    println!();
    print_team(home);
    println!();
    print_team(away);
}

fn print_entry(entry: &PlayByPlayEntry) {
    let secs = entry.time.ceil() as u32;
    println!(
        "Q{} {:>2}:{:02}  {:>3}-{:<3} {}",
        entry.quarter,
        secs / 60,
        secs % 60,
        entry.home_score,
        entry.away_score,
        entry.description
    );
}

fn print_team(team: &BoxScoreTeam) {
    println!("{} ({})", team.name, team.score);
    println!("{:<22} {:>5} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7} {:>4} {:>4}", "PLAYER", "MIN", "PTS", "REB", "AST", "FG", "3P", "FT", "PF", "+/-");
    for line in &team.players {
        let s = &line.stats;
        println!(
            "{:<22} {:>5.1} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7} {:>4} {:>4}",
            format!("{}{}", line.name, if line.starter { "*" } else { "" }),
            s.minutes,
            s.points,
            s.rebounds(),
            s.assists,
            format!("{}-{}", s.fgm, s.fga),
            format!("{}-{}", s.three_pm, s.three_pa),
            format!("{}-{}", s.ftm, s.fta),
            s.fouls,
            s.plus_minus
        );
    }
    let t = &team.totals;
    println!(
        "{:<22} {:>5} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7} {:>4}",
        "TOTAL",
        "",
        t.points,
        t.rebounds(),
        t.assists,
        format!("{}-{}", t.fgm, t.fga),
        format!("{}-{}", t.three_pm, t.three_pa),
        format!("{}-{}", t.ftm, t.fta),
        t.fouls
    );
}
