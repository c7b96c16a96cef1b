//! Wire codec
//!
//! The engine speaks newline-delimited ASCII lines: `:` separates records
//! within a line, `;` separates fields within a record. Every function here
//! is pure; the session loop owns all I/O.
//!
//! Map lines use the uniform layout: one payload field, three characters per
//! tile (elevation digit, buildable flag, walkable flag), tile resolution
//! throughout. The historical multi-resolution layout (six `:`-fields with
//! 4x walkability/elevation arrays) is rejected by field count rather than
//! misparsed.

use bwbridge_core::error::{BridgeError, Result};
use bwbridge_core::map::{ChokePoint, MapGrid, PIXELS_PER_TILE, TilePos};
use bwbridge_core::player::{
    PlayerDelta, PlayerStatus, Race, TECH_SLOTS, UPGRADE_SLOTS,
};
use bwbridge_core::unit::{UNIT_RECORD_FIELDS, Unit, UnitRecord};
use bwbridge_core::Command;
use std::fmt::Write as _;
use std::str::FromStr;

/// Header token of the outbound command batch line.
pub const COMMAND_BATCH_HEADER: &str = "commands";

/// Characters per tile in the map payload: elevation, buildable, walkable.
const CHARS_PER_TILE: usize = 3;

/// Chokepoints at least this wide (in tiles) are terrain-analysis false
/// positives, not real bottlenecks, and are discarded.
const MAX_CHOKE_WIDTH: i32 = 15;

/// Starting locations are reported at the building placement anchor; this
/// offset moves them to the visual top-left corner.
const START_LOCATION_OFFSET: (i32, i32) = (2, 1);

/// The four handshake capability flags, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub allow_user_control: bool,
    pub complete_information: bool,
    pub log_commands: bool,
    pub terrain_analysis: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            allow_user_control: true,
            complete_information: true,
            log_commands: true,
            terrain_analysis: true,
        }
    }
}

/// Encode the handshake response: exactly four `'0'`/`'1'` characters.
pub fn encode_capabilities(caps: &Capabilities) -> String {
    [
        caps.allow_user_control,
        caps.complete_information,
        caps.log_commands,
        caps.terrain_analysis,
    ]
    .iter()
    .map(|&flag| if flag { '1' } else { '0' })
    .collect()
}

fn malformed(what: &str, detail: impl std::fmt::Display) -> BridgeError {
    BridgeError::MalformedProtocol(format!("{what}: {detail}"))
}

fn parse_num<T: FromStr>(field: &str, what: &str) -> Result<T> {
    field
        .trim()
        .parse()
        .map_err(|_| malformed(what, format_args!("bad integer {field:?}")))
}

/// Non-empty `:`-records of a line, header token split off.
fn records(line: &str) -> impl Iterator<Item = &str> {
    line.trim_end_matches(['\r', '\n'])
        .split(':')
        .filter(|r| !r.is_empty())
}

/// Decode the handshake player line.
///
/// The header token is `;`-subdivided and carries the local player id in its
/// second field; each following record is `id;race;name;type;ally`.
pub fn decode_handshake(line: &str) -> Result<(u8, Vec<PlayerStatus>)> {
    let mut records = records(line);
    let header = records
        .next()
        .ok_or_else(|| malformed("handshake", "empty line"))?;
    let local_id = header
        .split(';')
        .nth(1)
        .ok_or_else(|| malformed("handshake", "header missing local player id"))
        .and_then(|field| parse_num::<u8>(field, "handshake local player id"))?;

    let mut players = Vec::new();
    for record in records {
        let fields: Vec<&str> = record.split(';').collect();
        if fields.len() != 5 {
            return Err(malformed(
                "handshake player record",
                format_args!("expected 5 fields, got {}", fields.len()),
            ));
        }

        let id = parse_num::<u8>(fields[0], "player id")?;
        let race: Race = fields[1].trim().parse()?;
        let name = fields[2].to_string();
        let player_type = parse_num::<i32>(fields[3], "player type")?;
        let is_ally = fields[4].trim() == "1";

        players.push(PlayerStatus::new(id, race, name, player_type, is_ally));
    }

    Ok((local_id, players))
}

/// Decode the map line: `name:width:height:payload` with three characters
/// per tile. The payload length must match the declared dimensions exactly.
pub fn decode_map(line: &str) -> Result<MapGrid> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(':').collect();
    if fields.len() == 6 {
        return Err(malformed(
            "map",
            "multi-resolution map layout is not supported",
        ));
    }
    if fields.len() != 4 {
        return Err(malformed(
            "map",
            format_args!("expected 4 fields, got {}", fields.len()),
        ));
    }

    let name = fields[0].to_string();
    let width: usize = parse_num(fields[1], "map width")?;
    let height: usize = parse_num(fields[2], "map height")?;
    let payload = fields[3].as_bytes();

    let tiles = width * height;
    if payload.len() != tiles * CHARS_PER_TILE {
        return Err(malformed(
            "map",
            format_args!(
                "payload is {} chars, expected {} for {}x{}",
                payload.len(),
                tiles * CHARS_PER_TILE,
                width,
                height
            ),
        ));
    }

    let mut elevation = Vec::with_capacity(tiles);
    let mut buildable = Vec::with_capacity(tiles);
    let mut walkable = Vec::with_capacity(tiles);
    for tile in payload.chunks_exact(CHARS_PER_TILE) {
        for &ch in tile {
            if !ch.is_ascii_digit() {
                return Err(malformed(
                    "map",
                    format_args!("non-digit payload character {:?}", ch as char),
                ));
            }
        }
        elevation.push(tile[0] - b'0');
        buildable.push(tile[1] == b'1');
        walkable.push(tile[2] == b'1');
    }

    Ok(MapGrid::new(name, width, height, elevation, buildable, walkable))
}

fn decode_positions(line: &str, what: &str) -> Result<Vec<TilePos>> {
    let mut positions = Vec::new();
    // First record is a discardable header token.
    for record in records(line).skip(1) {
        let fields: Vec<&str> = record.split(';').collect();
        if fields.len() != 2 {
            return Err(malformed(
                what,
                format_args!("expected 2 fields, got {}", fields.len()),
            ));
        }
        positions.push(TilePos::new(
            parse_num(fields[0], what)?,
            parse_num(fields[1], what)?,
        ));
    }
    Ok(positions)
}

/// Decode the starting-locations line, applying the fixed anchor offset.
pub fn decode_starting_locations(line: &str) -> Result<Vec<TilePos>> {
    let (dx, dy) = START_LOCATION_OFFSET;
    Ok(decode_positions(line, "starting location")?
        .into_iter()
        .map(|p| TilePos::new(p.x + dx, p.y + dy))
        .collect())
}

/// Decode the base-locations line.
pub fn decode_base_locations(line: &str) -> Result<Vec<TilePos>> {
    decode_positions(line, "base location")
}

/// Decode the chokepoints line. Coordinates and widths arrive in pixels and
/// convert to tiles; implausibly wide chokepoints are discarded.
pub fn decode_choke_points(line: &str) -> Result<Vec<ChokePoint>> {
    let mut chokes = Vec::new();
    for record in records(line).skip(1) {
        let fields: Vec<&str> = record.split(';').collect();
        if fields.len() != 3 {
            return Err(malformed(
                "chokepoint",
                format_args!("expected 3 fields, got {}", fields.len()),
            ));
        }

        let x = parse_num::<i32>(fields[0], "chokepoint x")? / PIXELS_PER_TILE;
        let y = parse_num::<i32>(fields[1], "chokepoint y")? / PIXELS_PER_TILE;
        let width = parse_num::<i32>(fields[2], "chokepoint width")? / PIXELS_PER_TILE;

        if width < MAX_CHOKE_WIDTH {
            chokes.push(ChokePoint { x, y, width });
        }
    }
    Ok(chokes)
}

fn decode_digits<const N: usize>(field: &str, what: &str) -> Result<[u8; N]> {
    let bytes = field.trim().as_bytes();
    if bytes.len() != N {
        return Err(malformed(
            what,
            format_args!("expected {N} digits, got {}", bytes.len()),
        ));
    }

    let mut digits = [0u8; N];
    for (slot, &ch) in digits.iter_mut().zip(bytes) {
        if !ch.is_ascii_digit() {
            return Err(malformed(what, format_args!("non-digit {:?}", ch as char)));
        }
        *slot = ch - b'0';
    }
    Ok(digits)
}

/// Decode a per-frame update line into the local player's delta and the
/// frame's classified unit set.
///
/// The first record is
/// `status;minerals;gas;supplyUsed;supplyTotal;researchDigits;upgradeDigits`;
/// every following record is a 17-field unit record. An unknown unit type id
/// is not an error; the catalog substitutes its sentinel descriptor at
/// lookup time.
pub fn decode_frame_update(
    line: &str,
    local_player_id: u8,
    players: &[Option<PlayerStatus>],
) -> Result<(PlayerDelta, Vec<Unit>)> {
    let mut records = records(line);
    let status = records
        .next()
        .ok_or_else(|| malformed("frame update", "empty line"))?;

    let fields: Vec<&str> = status.split(';').collect();
    if fields.len() != 7 {
        return Err(malformed(
            "frame status record",
            format_args!("expected 7 fields, got {}", fields.len()),
        ));
    }

    // fields[0] is an engine status code the bridge has no use for.
    let delta = PlayerDelta {
        minerals: parse_num(fields[1], "minerals")?,
        gas: parse_num(fields[2], "gas")?,
        supply_used: parse_num(fields[3], "supply used")?,
        supply_total: parse_num(fields[4], "supply total")?,
        research_progress: decode_digits::<TECH_SLOTS>(fields[5], "research progress")?,
        upgrade_progress: decode_digits::<UPGRADE_SLOTS>(fields[6], "upgrade progress")?,
    };

    let mut units = Vec::new();
    for record in records {
        let fields: Vec<&str> = record.split(';').collect();
        if fields.len() != UNIT_RECORD_FIELDS {
            return Err(malformed(
                "unit record",
                format_args!("expected {UNIT_RECORD_FIELDS} fields, got {}", fields.len()),
            ));
        }

        let mut ints = [0i32; UNIT_RECORD_FIELDS];
        for (slot, field) in ints.iter_mut().zip(fields.iter().copied()) {
            *slot = parse_num(field, "unit record")?;
        }
        let record = UnitRecord {
            id: ints[0],
            player_id: ints[1],
            type_id: ints[2],
            x: ints[3],
            y: ints[4],
            hit_points: ints[5],
            shields: ints[6],
            energy: ints[7],
            build_timer: ints[8],
            train_timer: ints[9],
            research_timer: ints[10],
            upgrade_timer: ints[11],
            order_timer: ints[12],
            order: ints[13],
            resources: ints[14],
            addon_id: ints[15],
            mine_count: ints[16],
        };

        if let Some(unit) = Unit::classify(&record, local_player_id, players)? {
            units.push(unit);
        }
    }

    Ok((delta, units))
}

/// Encode an outbound command batch: the literal header token followed by
/// one `kind;unitId;arg0;arg1;arg2` record per command, in supplied order.
pub fn encode_command_batch(commands: &[Command]) -> String {
    let mut line = String::from(COMMAND_BATCH_HEADER);
    for command in commands {
        let _ = write!(
            line,
            ":{};{};{};{};{}",
            command.kind.id(),
            command.unit_id,
            command.arg0,
            command.arg1,
            command.arg2
        );
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwbridge_core::CommandKind;

    fn two_players() -> (u8, Vec<PlayerStatus>) {
        decode_handshake("players;0:0;Terran;alice;1;0:1;Zerg;bob;1;0").unwrap()
    }

    fn player_table(players: Vec<PlayerStatus>) -> Vec<Option<PlayerStatus>> {
        let mut table: Vec<Option<PlayerStatus>> =
            (0..bwbridge_core::MAX_PLAYERS).map(|_| None).collect();
        for p in players {
            let slot = p.id() as usize;
            table[slot] = Some(p);
        }
        table
    }

    fn frame_status(minerals: i32) -> String {
        format!(
            "0;{};0;10;20;{};{}",
            minerals,
            "0".repeat(TECH_SLOTS),
            "0".repeat(UPGRADE_SLOTS)
        )
    }

    #[test]
    fn handshake_decodes_local_id_and_players() {
        let (local, players) = two_players();
        assert_eq!(local, 0);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].race(), Race::Terran);
        assert_eq!(players[1].name(), "bob");
        assert!(!players[1].is_ally());
    }

    #[test]
    fn handshake_rejects_bad_records() {
        // Wrong field count.
        assert!(decode_handshake("players;0:0;Terran;alice;1").is_err());
        // Unknown race token.
        assert!(decode_handshake("players;0:0;Hybrid;alice;1;0").is_err());
        // Header without a local id.
        assert!(decode_handshake("players").is_err());
    }

    #[test]
    fn capabilities_encode_in_wire_order() {
        assert_eq!(encode_capabilities(&Capabilities::default()), "1111");
        let caps = Capabilities {
            allow_user_control: true,
            complete_information: false,
            log_commands: false,
            terrain_analysis: true,
        };
        assert_eq!(encode_capabilities(&caps), "1001");
    }

    #[test]
    fn map_decodes_three_chars_per_tile() {
        // 2x2: elevations 0,1,2,0; buildable in the top row only; walkable everywhere.
        let grid = decode_map("plateau:2:2:011111201001").unwrap();
        assert_eq!(grid.name(), "plateau");
        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert_eq!(grid.elevation(1, 0), 1);
        assert_eq!(grid.elevation(0, 1), 2);
        assert!(grid.is_buildable(0, 0));
        assert!(!grid.is_buildable(0, 1));
        assert!(grid.is_walkable(1, 1));
    }

    #[test]
    fn map_payload_length_is_validated() {
        assert!(decode_map("m:2:2:011011").is_err());
        assert!(decode_map("m:2:2:011011011011011").is_err());
        assert!(decode_map("m:2:2:01101101101x").is_err());
    }

    #[test]
    fn map_rejects_multi_resolution_layout() {
        let err = decode_map("m:2:2:0110:0123:0101").unwrap_err();
        assert!(err.to_string().contains("multi-resolution"));
    }

    #[test]
    fn starting_locations_apply_anchor_offset() {
        let locations = decode_starting_locations("Locations:5;10").unwrap();
        assert_eq!(locations, vec![TilePos::new(7, 11)]);
    }

    #[test]
    fn base_locations_are_unadjusted() {
        let locations = decode_base_locations("Bases:5;10:0;3").unwrap();
        assert_eq!(locations, vec![TilePos::new(5, 10), TilePos::new(0, 3)]);
    }

    #[test]
    fn choke_points_convert_and_filter() {
        // 480px is 15 tiles: excluded by the strict < 15 filter.
        let chokes = decode_choke_points("Chokes:320;640;480").unwrap();
        assert!(chokes.is_empty());

        // 448px is 14 tiles: included.
        let chokes = decode_choke_points("Chokes:320;640;448").unwrap();
        assert_eq!(
            chokes,
            vec![ChokePoint {
                x: 10,
                y: 20,
                width: 14
            }]
        );
    }

    #[test]
    fn empty_terrain_lines_decode_to_nothing() {
        assert!(decode_choke_points("Chokes:").unwrap().is_empty());
        assert!(decode_base_locations("Bases:").unwrap().is_empty());
    }

    #[test]
    fn frame_update_decodes_delta_and_units() {
        let (local, players) = two_players();
        let table = player_table(players);

        let line = format!(
            "{}:1;0;7;4;5;60;0;0;0;0;0;0;0;23;0;0;0:2;11;176;9;9;0;0;0;0;0;0;0;0;0;1500;0;0",
            frame_status(50)
        );
        let (delta, units) = decode_frame_update(&line, local, &table).unwrap();

        assert_eq!(delta.minerals, 50);
        assert_eq!(delta.supply_total, 20);
        assert_eq!(units.len(), 2);
        assert!(matches!(units[0], Unit::Mine(_)));
        assert!(matches!(units[1], Unit::MineralPatch(_)));
        assert_eq!(units[1].data().resources, 1500);
    }

    #[test]
    fn unit_record_decode_is_lossless() {
        let (local, players) = two_players();
        let table = player_table(players);

        let record = "31;0;7;4;5;60;12;3;9;8;7;6;5;23;450;32;2";
        let line = format!("{}:{}", frame_status(0), record);
        let (_, units) = decode_frame_update(&line, local, &table).unwrap();

        let u = units[0].data();
        let reencoded = format!(
            "{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{}",
            u.id,
            u.player_id,
            u.type_id,
            u.x,
            u.y,
            u.hit_points,
            u.shields,
            u.energy,
            u.build_timer,
            u.train_timer,
            u.research_timer,
            u.upgrade_timer,
            u.order_timer,
            u.order,
            u.resources,
            u.addon_id,
            u.mine_count
        );
        assert_eq!(reencoded, record);
    }

    #[test]
    fn frame_update_rejects_wrong_field_counts() {
        let (local, players) = two_players();
        let table = player_table(players);

        // 16-field unit record.
        let short = format!("{}:1;0;7;4;5;60;0;0;0;0;0;0;0;0;0;0", frame_status(0));
        assert!(decode_frame_update(&short, local, &table).is_err());

        // Truncated status record.
        let bad_status = format!("0;50;0;10;20;{}", "0".repeat(TECH_SLOTS));
        assert!(decode_frame_update(&bad_status, local, &table).is_err());

        // Digit vector of the wrong length.
        let bad_digits = format!(
            "0;50;0;10;20;{};{}",
            "0".repeat(TECH_SLOTS - 1),
            "0".repeat(UPGRADE_SLOTS)
        );
        assert!(decode_frame_update(&bad_digits, local, &table).is_err());
    }

    #[test]
    fn unknown_type_id_does_not_fail_decode() {
        let (local, players) = two_players();
        let table = player_table(players);

        let line = format!(
            "{}:1;0;9999;4;5;60;0;0;0;0;0;0;0;0;0;0;0",
            frame_status(0)
        );
        let (_, units) = decode_frame_update(&line, local, &table).unwrap();
        assert_eq!(units[0].data().type_id, 9999);
    }

    #[test]
    fn command_batch_encodes_in_supplied_order() {
        let commands = vec![
            Command::new(CommandKind::RightClickUnit, 12, 77, 0, 0),
            Command::new(CommandKind::Build, 5, 30, 40, 109),
        ];
        assert_eq!(
            encode_command_batch(&commands),
            "commands:4;12;77;0;0:6;5;30;40;109"
        );
        assert_eq!(encode_command_batch(&[]), "commands");
    }
}
