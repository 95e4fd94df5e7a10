//! Fixed option lists offered on the signup form.

pub const TOW_FACTIONS: &[&str] = &[
    "Empire of Man",
    "Dwarfen Mountain Holds",
    "Kingdom of Bretonnia",
    "Wood Elf Realms",
    "High Elf Realms",
    "Orc & Goblin Tribes",
    "Warriors of Chaos",
    "Beastmen Brayheards",
    "Tomb Kings of Khemri",
    "Skaven",
    "Ogre Kingdoms",
    "Lizardmen",
    "Chaos Dwarfs",
    "Dark Elves",
    "Daemons of Chaos",
    "Vampire Counts",
    "Grand Cathay",
];

pub const HH_FACTIONS: &[&str] = &[
    "I - Dark Angels",
    "III - Emperor's Children",
    "IV - Iron Warriors",
    "V - White Scars",
    "VI - Space Wolves",
    "VII - Imperial Fists",
    "VIII - Night Lords",
    "IX - Blood Angels",
    "X - Iron Hands",
    "XII - World Eaters",
    "XIII - Ultramarines",
    "XIV - Death Guard",
    "XV - Thousand Sons",
    "XVI - Sons of Horus",
    "XVII - Word Bearers",
    "XVIII - Salamanders",
    "XIX - Raven Guard",
    "XX - Alpha Legion",
    "Anathema Psykana",
    "Legio Custodes",
    "Mechanicum",
    "Questoris Familia",
    "Solar Auxilia",
];

pub const TOW_GAME_TYPES: &[&str] = &["Casual", "Competitive", "Intro", "Either"];
pub const HH_GAME_TYPES: &[&str] = &["Standard", "Intro", "Either"];

pub const EXPERIENCE_LEVELS: &[&str] = &["New", "Some", "Veteran"];

pub const SCENARIOS: &[&str] = &["Open Battle", "Weekly Scenario"];

pub const MAX_POINTS: i64 = 10_000;

pub const DEFAULT_ETA: &str = "18:30";

/// Arrival slots from 17:00 to 19:30 every quarter hour
pub fn eta_options() -> Vec<String> {
    (17..=19)
        .flat_map(|hour| [0, 15, 30, 45].into_iter().map(move |minute| (hour, minute)))
        .filter(|&(hour, minute)| !(hour == 19 && minute > 30))
        .map(|(hour, minute)| format!("{:02}:{:02}", hour, minute))
        .collect()
}
