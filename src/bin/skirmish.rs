//! Headless Skirmish Runner
//!
//! Runs AI vs AI dungeon skirmishes and outputs a JSON battle report.

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gloomdelve::combat::combatant::{Combatant, ControlKind};
use gloomdelve::combat::equipment::{ArmorPiece, Shield, Weapon};
use gloomdelve::combat::{
    start_battle, BattleStatus, CombatContext, RecordingPresenter, RoundController, RoundModifiers,
    TurnEvent,
};
use gloomdelve::core::types::{Cell, CombatantId};
use gloomdelve::dice::SeededDice;
use gloomdelve::spatial::{PositionQuery, SquareGrid};

/// Headless Skirmish Runner - AI vs AI battles on a square grid
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run AI vs AI dungeon skirmishes and output a JSON report")]
struct Args {
    /// Number of heroes on the player side
    #[arg(long, default_value_t = 2)]
    heroes: usize,

    /// Number of ghouls on the monster side
    #[arg(long, default_value_t = 3)]
    monsters: usize,

    /// Map width in cells
    #[arg(long, default_value_t = 16)]
    map_width: i32,

    /// Map height in cells
    #[arg(long, default_value_t = 10)]
    map_height: i32,

    /// Maximum rounds before timeout (draw)
    #[arg(long, default_value_t = 30)]
    max_rounds: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable verbose narration on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishReport {
    outcome: String,
    rounds: u32,
    heroes_standing: usize,
    monsters_standing: usize,
    narration: Vec<String>,
    seed: u64,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut dice = SeededDice::new(seed);

    let mut grid = SquareGrid::new(args.map_width, args.map_height);
    let mut party = Vec::new();
    for i in 0..args.heroes {
        let cell = Cell::new(1, 1 + i as i32);
        let mut hero = Combatant::new(&format!("hero {}", i + 1), ControlKind::PlayerControlled, cell);
        hero.stats.melee_skill = 55;
        hero.weapon = Weapon::sword();
        hero.shield = Some(Shield::round(3));
        hero.armor.push(ArmorPiece::breastplate(4));
        hero.armor.push(ArmorPiece::helmet(2));
        hero.quick_slots = vec!["torch".into(), "potion".into()];
        grid.place(hero.id, cell);
        party.push(hero);
    }
    for i in 0..args.monsters {
        let cell = Cell::new(args.map_width - 2, 1 + i as i32);
        let mut ghoul = Combatant::new(&format!("ghoul {}", i + 1), ControlKind::AIControlled, cell);
        ghoul.stats.melee_skill = 45;
        ghoul.weapon = Weapon::fists();
        ghoul.natural_armor = 1;
        grid.place(ghoul.id, cell);
        party.push(ghoul);
    }

    let mut controller = match start_battle(party, RoundModifiers::default()) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("invalid skirmish setup: {}", e);
            return;
        }
    };
    let mut presenter = RecordingPresenter::default();

    controller.start_round();
    while controller.status() == BattleStatus::Ongoing && controller.round() <= args.max_rounds {
        let event = match controller.next_turn(&mut grid, &mut dice, &mut presenter) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("skirmish aborted: {}", e);
                break;
            }
        };
        match event {
            TurnEvent::RoundOver => controller.start_round(),
            TurnEvent::BattleOver(_) => break,
            TurnEvent::TurnStarted { actor, .. } => {
                if let Err(e) =
                    take_turn(&mut controller, &mut grid, &mut dice, &mut presenter, actor)
                {
                    eprintln!("turn failed: {}", e);
                    break;
                }
            }
            TurnEvent::NoEligibleActor(_)
            | TurnEvent::TurnForfeited { .. }
            | TurnEvent::DrawDeclined => {}
        }
    }

    if args.verbose {
        for line in &presenter.lines {
            eprintln!("  {}", line);
        }
    }

    let outcome = match controller.status() {
        BattleStatus::Ongoing => "Timeout".to_string(),
        BattleStatus::Won(ControlKind::PlayerControlled) => "HeroesWin".to_string(),
        BattleStatus::Won(ControlKind::AIControlled) => "MonstersWin".to_string(),
        BattleStatus::MutualDestruction => "MutualDestruction".to_string(),
    };

    let report = SkirmishReport {
        outcome,
        rounds: controller.round(),
        heroes_standing: controller
            .roster
            .active_of(ControlKind::PlayerControlled)
            .count(),
        monsters_standing: controller
            .roster
            .active_of(ControlKind::AIControlled)
            .count(),
        narration: presenter.lines.clone(),
        seed,
    };

    match args.format.as_str() {
        "text" => {
            println!("Skirmish Report");
            println!("===============");
            println!("Outcome: {}", report.outcome);
            println!("Rounds: {}", report.rounds);
            println!(
                "Standing: {} heroes, {} monsters",
                report.heroes_standing, report.monsters_standing
            );
            println!("Seed: {}", report.seed);
        }
        _ => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("failed to serialize report: {}", e),
        },
    }
}

/// Close with the nearest enemy and attack once adjacent
fn take_turn(
    controller: &mut RoundController,
    grid: &mut SquareGrid,
    dice: &mut SeededDice,
    presenter: &mut RecordingPresenter,
    actor: CombatantId,
) -> gloomdelve::Result<()> {
    let (control, position) = {
        let c = controller.roster.get(actor)?;
        (c.control, c.position)
    };
    let Some(mut position) = position else {
        return Ok(());
    };

    let target = nearest_enemy(controller, control, position);
    let Some((target_id, target_pos)) = target else {
        return Ok(());
    };

    // Spend movement closing the gap
    let mut moves = controller.roster.get(actor)?.movement_points;
    let mut goal = target_pos;
    while moves > 0 && position.distance(&goal) > 1 {
        let (dx, dy) = position.step_toward(&goal);
        let next = position.offset(dx, dy);
        if !grid.is_walkable(next) || grid.occupant(next).is_some() {
            break;
        }
        grid.move_to(actor, next);
        position = next;
        moves -= 1;
        // Re-target in case the enemy died to an earlier status tick
        if let Some((_, fresh)) = nearest_enemy(controller, control, position) {
            goal = fresh;
        }
    }
    {
        let c = controller.roster.get_mut(actor)?;
        c.position = Some(position);
        c.movement_points = moves;
    }

    if position.distance(&goal) <= 1 {
        while controller.roster.get(actor)?.action_points > 0
            && controller.roster.get(target_id)?.is_active()
        {
            controller.perform_attack(
                grid,
                dice,
                presenter,
                actor,
                target_id,
                CombatContext::default(),
            )?;
        }
    }
    Ok(())
}

fn nearest_enemy(
    controller: &RoundController,
    control: ControlKind,
    from: Cell,
) -> Option<(CombatantId, Cell)> {
    controller
        .roster
        .iter()
        .filter(|c| c.control != control && c.is_active())
        .filter_map(|c| c.position.map(|p| (c.id, p)))
        .min_by_key(|(_, p)| from.distance(p))
}
