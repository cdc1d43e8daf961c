use regex::Regex;
use std::sync::LazyLock;

// Real data examples:
//   Vito Valsequillo (35008831)
//   Ecoener CB Castillo & (35003808)
//   Aqualia Ingenio (35002661)3)                       <- stray text after the code
//   Valsequillo (35008832)nt Valsequillo (35008840)    <- two cells glued together
//   Pab Pedro Padilla                                  <- venue, no code

static RE_TEAM_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\d+\)").unwrap());

static RE_TRAILING_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s&*·\-]+$").unwrap());

/// Does this line carry a team registration code such as "(35008832)"?
///
/// Venue and category lines never do, so this is what tells a neighbouring
/// team entry apart from the rest of a match block.
pub fn looks_like_team_line(line: &str) -> bool {
    RE_TEAM_CODE.is_match(line)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn a raw team line into a display name.
///
/// Everything after the first code is dropped when there is a name before
/// it, which takes care of glued cells and garbage tails.
pub fn clean_team_name(line: &str) -> String {
    let head = match RE_TEAM_CODE.find(line) {
        Some(m) if !line[..m.start()].trim().is_empty() => &line[..m.start()],
        _ => line,
    };
    let without_codes = RE_TEAM_CODE.replace_all(head, " ");
    let collapsed = normalize_ws(&without_codes);
    RE_TRAILING_SYMBOLS.replace(&collapsed, "").into_owned()
}

/// The club whose fixtures are being extracted.
#[derive(Debug, Clone)]
pub struct TrackedTeam {
    name: String,
    needle: String,
}

impl TrackedTeam {
    pub fn new(name: &str) -> Self {
        let name = normalize_ws(name);
        let needle = name.to_lowercase();
        Self { name, needle }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive substring test, blind to runs of whitespace.
    /// Independent of the code heuristic: a venue named after the club
    /// ("IES Valsequillo") matches too.
    pub fn is_mentioned_in(&self, line: &str) -> bool {
        !self.needle.is_empty() && normalize_ws(line).to_lowercase().contains(&self.needle)
    }
}
