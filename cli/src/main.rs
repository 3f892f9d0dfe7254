// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A thin text harness for `novafleet`. Reads one command per line, forwards it to a
//! [`Game`], and prints whatever events come back. Not a renderer: no glyphs, no color,
//! no screen layout — see `place`/`getships` below for the plainest possible rendering
//! of what the engine reports.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context, Result};
use clap::{App, Arg};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

use novafleet::bots::{Hunter, Randomer};
use novafleet::entity::EntityKind;
use novafleet::event::CellStatus;
use novafleet::field::{FieldSpec, Shape};
use novafleet::player::Placement;
use novafleet::{parse_coord, Coord, Event, Game, GameState};

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("novafleet")
        .version("0.1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Command-line harness for the novafleet combat engine.")
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("seed the engine's RNG for a reproducible game")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("inventory_cap")
                .long("inventory-cap")
                .value_name("CAP")
                .help("clamp every pending entity count to at most CAP")
                .takes_value(true),
        )
        .get_matches();

    let seed = matches.value_of("seed").map(|s| s.parse()).transpose().context("--seed must be a number")?;
    let inventory_cap = matches
        .value_of("inventory_cap")
        .map(|s| s.parse())
        .transpose()
        .context("--inventory-cap must be a number")?;

    let stdin = io::stdin();
    let mut input = InputReader::new(stdin.lock());

    println!("novafleet command harness. Type 'help' for the command list, 'exit' to quit.");
    let mut session = Session::new(seed, inventory_cap);
    loop {
        let line = match input.read_line("> ")? {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match session.dispatch(line) {
            Ok(Control::Continue) => {}
            Ok(Control::Exit) => break,
            Err(err) => println!("error: {}", err),
        }
    }
    Ok(())
}

enum Control {
    Continue,
    Exit,
}

/// Owns the live [`Game`] plus each player's bot, if they were assigned one with
/// `bot <name> <hunter|random>`. Rebuilt wholesale on `restart`.
struct Session {
    game: Game,
    seed: Option<u64>,
    inventory_cap: Option<u32>,
    bots: HashMap<String, Bot>,
}

enum Bot {
    Hunter(Hunter),
    Randomer(Randomer),
}

impl Session {
    fn new(seed: Option<u64>, inventory_cap: Option<u32>) -> Self {
        Self { game: Game::new("cli".to_string(), seed, inventory_cap), seed, inventory_cap, bots: HashMap::new() }
    }

    fn dispatch(&mut self, line: &str) -> Result<Control> {
        static ADD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^add\s+(?P<name>\S+)$").unwrap());
        static DELETE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^delete\s+(?P<name>\S+)$").unwrap());
        static COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^color\s+(?P<name>\S+)\s+(?P<color>\S+)$").unwrap());
        static FIELD_RECT: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?i)^field\s+(?P<name>\S+)\s+rect(?:angle)?\s+(?P<h>\d+)\s+(?P<w>\d+)$").unwrap());
        static FIELD_CIRCLE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?i)^field\s+(?P<name>\S+)\s+circle\s+(?P<r>\d+)$").unwrap());
        static FIELD_POLY: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^field\s+(?P<name>\S+)\s+(?P<shape>triangle|rhombus|pentagon|hexagon|heptagon)\s+(?P<r>\d+)(?:\s+(?P<angle>-?\d+(?:\.\d+)?))?$").unwrap()
        });
        static GETSHIPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^getships\s+(?P<name>\S+)$").unwrap());
        static PLACE_SHIP: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^place\s+(?P<name>\S+)\s+(?P<kind>corvette|frigate|destroyer|cruiser|relay)\s+(?P<coord>[A-Za-z]\d+)\s+(?P<rot>-?\d+)$").unwrap()
        });
        static PLACE_PLANET: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^place\s+(?P<name>\S+)\s+planet\s+(?P<coord>[A-Za-z]\d+)\s+(?P<radius>\d+)(?:\s+(?P<sign>[+-]1))?$").unwrap()
        });
        static APL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^apl\s+(?P<name>\S+)$").unwrap());
        static SHOOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^shoot\s+(?P<name>\S+)\s+(?P<coord>[A-Za-z]\d+)$").unwrap());
        static PRESET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^preset\s+(?P<name>\S+)\s+(?P<preset>\S+)$").unwrap());
        static BOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^bot\s+(?P<name>\S+)\s+(?P<kind>hunter|random)$").unwrap());

        let lower = line.to_ascii_lowercase();
        match lower.as_str() {
            "help" | "h" | "?" => {
                print_help();
                return Ok(Control::Continue);
            }
            "exit" | "quit" => return Ok(Control::Exit),
            "ready" => {
                print_events(self.game.ready()?);
                return Ok(Control::Continue);
            }
            "start" => {
                print_events(self.game.start()?);
                self.seed_bots();
                self.drive_bots()?;
                return Ok(Control::Continue);
            }
            "restart" => {
                self.game = Game::new("cli".to_string(), self.seed, self.inventory_cap);
                self.bots.clear();
                println!("game restarted");
                return Ok(Control::Continue);
            }
            _ => {}
        }

        if let Some(c) = ADD.captures(line) {
            print_events(self.game.set_player(c["name"].to_string())?);
        } else if let Some(c) = DELETE.captures(line) {
            print_events(self.game.del_player(&c["name"])?);
        } else if let Some(c) = COLOR.captures(line) {
            print_events(self.game.change_player_color(&c["name"], &c["color"])?);
        } else if let Some(c) = FIELD_RECT.captures(line) {
            let height: usize = c["h"].parse().context("bad height")?;
            let width: usize = c["w"].parse().context("bad width")?;
            print_events(self.game.change_player_field(&c["name"], FieldSpec::Rectangle { height, width })?);
        } else if let Some(c) = FIELD_CIRCLE.captures(line) {
            let radius: i32 = c["r"].parse().context("bad radius")?;
            print_events(self.game.change_player_field(&c["name"], FieldSpec::Circle { radius })?);
        } else if let Some(c) = FIELD_POLY.captures(line) {
            let shape = parse_shape(&c["shape"].to_ascii_lowercase())?;
            let radius: i32 = c["r"].parse().context("bad radius")?;
            let angle_degrees = c.name("angle").map(|m| m.as_str().parse()).transpose().context("bad angle")?.unwrap_or(0.0);
            print_events(self.game.change_player_field(&c["name"], FieldSpec::Polygon { shape, radius, angle_degrees })?);
        } else if let Some(c) = GETSHIPS.captures(line) {
            let meta = self.game.get_player_meta(&c["name"]).ok_or_else(|| anyhow!("no player named {:?}", &c["name"]))?;
            println!(
                "{}: color={:?} field={:?} {}x{} pending={:?}",
                meta.name, meta.color, meta.field_shape, meta.field_height, meta.field_width, meta.pending
            );
        } else if let Some(c) = PLACE_SHIP.captures(line) {
            let kind = parse_kind(&c["kind"].to_ascii_lowercase())?;
            let anchor = parse_coord(&c["coord"].to_ascii_uppercase()).map_err(|e| anyhow!("bad coordinate: {}", e))?;
            let rotation: i32 = c["rot"].parse().context("bad rotation")?;
            print_events(self.game.place_entity(&c["name"], kind, Placement::Ship { anchor, rotation })?);
        } else if let Some(c) = PLACE_PLANET.captures(line) {
            let center = parse_coord(&c["coord"].to_ascii_uppercase()).map_err(|e| anyhow!("bad coordinate: {}", e))?;
            let radius: i32 = c["radius"].parse().context("bad radius")?;
            let rotation_sign = c.name("sign").map(|m| if m.as_str() == "+1" { 1 } else { -1 });
            print_events(self.game.place_entity(&c["name"], EntityKind::Planet, Placement::Planet { center, radius, rotation_sign })?);
        } else if let Some(c) = APL.captures(line) {
            let (events, summary) = self.game.autoplace(&c["name"])?;
            print_events(events);
            println!("{}", summary);
        } else if let Some(c) = SHOOT.captures(line) {
            let coord = parse_coord(&c["coord"].to_ascii_uppercase()).map_err(|e| anyhow!("bad coordinate: {}", e))?;
            let (shooter_event, target_event) = self.game.shoot(&c["name"], coord)?;
            print_event(&shooter_event);
            print_event(&target_event);
            self.drive_bots()?;
        } else if let Some(c) = PRESET.captures(line) {
            let pending = preset_fleet(&c["preset"].to_ascii_lowercase())?;
            print_events(self.game.change_entity_list(&c["name"], pending)?);
        } else if let Some(c) = BOT.captures(line) {
            let bot = match c["kind"].to_ascii_lowercase().as_str() {
                "hunter" => Bot::Hunter(Hunter::new()),
                _ => Bot::Randomer(Randomer::new()),
            };
            self.bots.insert(c["name"].to_string(), bot);
            println!("{} is now bot-controlled ({})", &c["name"], &c["kind"]);
        } else {
            println!("unrecognized command {:?}. Use 'help' for the command list", line);
        }
        Ok(Control::Continue)
    }

    /// Seeds every bot's view of the field it's shooting at with the opponent's free
    /// cells, once the game has just transitioned to `Active`.
    fn seed_bots(&mut self) {
        if self.game.state() != GameState::Active || self.bots.is_empty() {
            return;
        }
        let names: Vec<String> = self.game.get_player_names().to_vec();
        for name in &names {
            if let Some(bot) = self.bots.get_mut(name) {
                let opponent = names.iter().find(|n| *n != name);
                if let Some(opponent) = opponent {
                    if let Some(meta) = self.game.get_player_meta(opponent) {
                        let coords = (0..meta.field_height as i32).flat_map(|y| (0..meta.field_width as i32).map(move |x| Coord::new(y, x)));
                        match bot {
                            Bot::Hunter(h) => h.seed_free(coords),
                            Bot::Randomer(r) => r.seed_free(coords),
                        }
                    }
                }
            }
        }
    }

    /// Fires every bot-controlled player's shot while it's their turn, stopping as soon
    /// as the game is over or the turn belongs to a player with no bot assigned.
    fn drive_bots(&mut self) -> Result<()> {
        let mut rng = rand::thread_rng();
        while self.game.state() == GameState::Active {
            let turn = self.game.whos_turn().to_string();
            let shot = match self.bots.get(&turn) {
                Some(Bot::Hunter(h)) => h.shoot(&mut rng),
                Some(Bot::Randomer(r)) => r.shoot(&mut rng),
                None => break,
            };
            let coord = match shot {
                Some(coord) => coord,
                None => break,
            };
            info!("bot {} shoots {}", turn, coord);
            let (shooter_event, target_event) = self.game.shoot(&turn, coord)?;
            print_event(&shooter_event);
            print_event(&target_event);
            self.record_bot_result(&turn, &target_event, &shooter_event);
        }
        Ok(())
    }

    fn record_bot_result(&mut self, shooter: &str, target_event: &Event, shooter_event: &Event) {
        if let Event::Shot { shot_results, destroyed_cells, .. } = target_event {
            if let Some(bot) = self.bots.get_mut(shooter) {
                for (&coord, &status) in shot_results {
                    match bot {
                        Bot::Hunter(h) => h.shot_result(coord, status),
                        Bot::Randomer(r) => r.shot_result(coord, status),
                    }
                }
                match bot {
                    Bot::Hunter(h) => h.validate_destruction(destroyed_cells),
                    Bot::Randomer(r) => r.validate_destruction(destroyed_cells),
                }
            }
        }
        if let Event::Shot { shot_results, .. } = shooter_event {
            if let Some(bot) = self.bots.get_mut(shooter) {
                for (&coord, &status) in shot_results {
                    match bot {
                        Bot::Hunter(h) => h.shot_result(coord, status),
                        Bot::Randomer(r) => r.shot_result(coord, status),
                    }
                }
            }
        }
    }
}

fn parse_kind(name: &str) -> Result<EntityKind> {
    Ok(match name {
        "corvette" => EntityKind::Corvette,
        "frigate" => EntityKind::Frigate,
        "destroyer" => EntityKind::Destroyer,
        "cruiser" => EntityKind::Cruiser,
        "relay" => EntityKind::Relay,
        other => return Err(anyhow!("unknown entity kind {:?}", other)),
    })
}

fn parse_shape(name: &str) -> Result<Shape> {
    Ok(match name {
        "triangle" => Shape::Triangle,
        "rhombus" => Shape::Rhombus,
        "pentagon" => Shape::Pentagon,
        "hexagon" => Shape::Hexagon,
        "heptagon" => Shape::Heptagon,
        other => return Err(anyhow!("unknown field shape {:?}", other)),
    })
}

/// Standard fleets a renderer can offer as a one-word shortcut instead of spelling out
/// every `EntityKind`/count pair. `classic` mirrors the four-ship fleet used throughout
/// the engine's own test suite; `skirmish` is a faster-playing subset.
fn preset_fleet(name: &str) -> Result<HashMap<EntityKind, u32>> {
    let mut pending = HashMap::new();
    match name {
        "classic" => {
            pending.insert(EntityKind::Corvette, 4);
            pending.insert(EntityKind::Frigate, 3);
            pending.insert(EntityKind::Destroyer, 2);
            pending.insert(EntityKind::Cruiser, 1);
        }
        "skirmish" => {
            pending.insert(EntityKind::Corvette, 2);
            pending.insert(EntityKind::Destroyer, 1);
        }
        "outpost" => {
            pending.insert(EntityKind::Corvette, 2);
            pending.insert(EntityKind::Relay, 1);
            pending.insert(EntityKind::Planet, 1);
        }
        other => return Err(anyhow!("unknown preset {:?}, choose \"classic\", \"skirmish\" or \"outpost\"", other)),
    }
    Ok(pending)
}

fn print_events(events: Vec<Event>) {
    for event in &events {
        print_event(event);
    }
}

fn print_event(event: &Event) {
    match event {
        Event::Lobby { subkind, payload, .. } => println!("[lobby:{:?}] {}", subkind, payload),
        Event::Place { player_name, entity_type, entity_id, anchor, cells_occupied, .. } => {
            println!("[place] {} placed {:?}#{} at {} ({} cells)", player_name, entity_type, entity_id, anchor, cells_occupied.len())
        }
        Event::Shot { shooter, target, coords, shot_results, destroyed_cells, game_state, .. } => {
            for (coord, status) in shot_results {
                println!("[shot] {} -> {} at {}: {}", shooter, target, coord, describe_status(*status));
            }
            if !destroyed_cells.is_empty() {
                println!("[shot] {}: an entity was destroyed ({} cells)", target, destroyed_cells.len());
            }
            if *game_state == GameState::Over {
                println!("[shot] game over, last shot at {}", coords);
            }
        }
    }
}

fn describe_status(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Miss => "miss",
        CellStatus::Hit => "hit",
        CellStatus::Relay => "relay",
        CellStatus::Entity => "entity",
        CellStatus::Planet => "planet",
        CellStatus::Free => "free",
        CellStatus::Void => "void",
    }
}

fn print_help() {
    println!(
        "Available commands:
    add <name>                              add a player
    delete <name>                           remove a player (lobby only)
    color <name> <color>                    set a player's color
    field <name> rect <h> <w>               set a rectangular field
    field <name> circle <r>                 set a circular field
    field <name> <shape> <r> [angle]        set a polygon field (triangle, rhombus,
                                             pentagon, hexagon, heptagon)
    preset <name> <classic|skirmish|outpost> set a standard pending fleet
    getships <name>                         show a player's pending/placed summary
    bot <name> <hunter|random>              hand a player's shots to a bot
    ready                                    move from lobby to setup
    place <name> <kind> <coord> <rot>       place a ship/relay (kind: corvette, frigate,
                                             destroyer, cruiser, relay)
    place <name> planet <coord> <radius> [+1|-1]  place a planet
    apl <name>                              autoplace a player's remaining fleet
    start                                    move from setup to active
    shoot <name> <coord>                    fire a shot, e.g. \"shoot P1 C4\"
    restart                                  abandon this game and start a new one
    help                                     show this list
    exit                                     quit"
    );
}

/// Helper to read one line of input, printing a prompt first. Returns `None` on EOF.
struct InputReader<B> {
    read: B,
    buf: String,
}

impl<B: BufRead> InputReader<B> {
    fn new(read: B) -> Self {
        Self { read, buf: String::new() }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        self.buf.clear();
        if self.read.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.buf)))
    }
}
