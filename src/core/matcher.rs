use std::collections::{HashMap, HashSet};

use crate::core::scoring::{
    build_preference, is_intro_seeker, normalize_name, pair_distance, raw_distance, PairDistance,
    Preference,
};
use crate::core::week::WeekId;
use crate::models::{GameSystem, NewPairing, Signup};

/// Tunables for one generation run
#[derive(Debug, Clone, Copy)]
pub struct PairingOptions {
    /// Fall back to recent opponents when nobody else is left
    pub allow_rematches: bool,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            allow_rematches: true,
        }
    }
}

/// Unordered pairs of normalised player names that met recently
#[derive(Debug, Clone, Default)]
pub struct RecentOpponents {
    pairs: HashSet<(String, String)>,
}

impl RecentOpponents {
    /// Collect opponents from past games `(week, player a, player b)` that fall
    /// within `max_weeks` whole weeks of `target`
    ///
    /// Entries whose week does not parse are ignored.
    pub fn from_history<'a, I>(target: &WeekId, history: I, max_weeks: i64) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut recent = Self::default();
        for (week, a, b) in history {
            let Ok(week) = week.parse::<WeekId>() else {
                continue;
            };
            if target.weeks_between(&week) > max_weeks {
                continue;
            }
            recent.insert(a, b);
        }
        recent
    }

    pub fn insert(&mut self, a: &str, b: &str) {
        let (a, b) = (normalize_name(a), normalize_name(b));
        if a == b {
            return;
        }
        self.pairs.insert(Self::ordered(a, b));
    }

    /// Both arguments must already be normalised keys
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs
            .contains(&Self::ordered(a.to_string(), b.to_string()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn ordered(a: String, b: String) -> (String, String) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    signup: Signup,
    key: String,
    preference: Preference,
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default)]
pub struct PairingPlan {
    pub pairings: Vec<NewPairing>,
    pub candidates: usize,
    pub intro_pairs: usize,
    pub byes: usize,
}

/// Weekly pairing generator
///
/// # Stages
/// 1. Latest signup per player
/// 2. Intro seekers matched with players able to lead an intro game
/// 3. Greedy nearest-preference matching over the sorted pool, avoiding
///    recent opponents
/// 4. Leftover players get a BYE
#[derive(Debug, Clone, Default)]
pub struct PairingGenerator {
    options: PairingOptions,
}

impl PairingGenerator {
    pub fn new(options: PairingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> PairingOptions {
        self.options
    }

    pub fn generate(
        &self,
        system: GameSystem,
        signups: Vec<Signup>,
        recent: &RecentOpponents,
    ) -> PairingPlan {
        let mut candidates = latest_per_player(signups);
        let total = candidates.len();
        if candidates.is_empty() {
            return PairingPlan::default();
        }

        let mut pairings = Vec::new();
        let intro_used = intro_pass(&candidates, &mut pairings);
        let intro_pairs = pairings.len();
        candidates.retain(|c| !intro_used.contains(&c.key));

        candidates.sort_by(|a, b| {
            a.preference
                .cmp(&b.preference)
                .then_with(|| a.key.cmp(&b.key))
        });

        let mut used: HashSet<String> = HashSet::new();
        let mut byes = 0;

        for i in 0..candidates.len() {
            let current = &candidates[i];
            if used.contains(&current.key) {
                continue;
            }

            let mut partner = find_partner(&candidates, i, &used, recent, system, false);
            if partner.is_none() && self.options.allow_rematches {
                partner = find_partner(&candidates, i, &used, recent, system, true);
            }

            match partner {
                Some(j) => {
                    let other = &candidates[j];
                    tracing::trace!(a = %current.key, b = %other.key, "paired");
                    pairings.push(pair_of(&current.signup, Some(&other.signup)));
                    used.insert(current.key.clone());
                    used.insert(other.key.clone());
                }
                None => {
                    tracing::trace!(player = %current.key, "bye");
                    pairings.push(pair_of(&current.signup, None));
                    used.insert(current.key.clone());
                    byes += 1;
                }
            }
        }

        PairingPlan {
            pairings,
            candidates: total,
            intro_pairs,
            byes,
        }
    }
}

/// Keep the latest signup per normalised name, in first-seen order
fn latest_per_player(mut signups: Vec<Signup>) -> Vec<Candidate> {
    signups.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, Signup> = HashMap::new();

    for signup in signups {
        let key = normalize_name(&signup.player_name);
        match latest.get(&key) {
            Some(prev) if signup.created_at <= prev.created_at => {}
            Some(_) => {
                latest.insert(key, signup);
            }
            None => {
                order.push(key.clone());
                latest.insert(key, signup);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            latest.remove(&key).map(|signup| Candidate {
                preference: build_preference(&signup),
                signup,
                key,
            })
        })
        .collect()
}

/// Pair every intro seeker with the closest available intro leader
fn intro_pass(candidates: &[Candidate], pairings: &mut Vec<NewPairing>) -> HashSet<String> {
    let mut used = HashSet::new();
    let leaders: Vec<&Candidate> = candidates.iter().filter(|c| c.signup.details.can_demo).collect();

    for seeker in candidates.iter().filter(|c| is_intro_seeker(&c.signup)) {
        if used.contains(&seeker.key) {
            continue;
        }

        let mut best: Option<&Candidate> = None;
        let mut best_dist = PairDistance::WORST;
        for lead in &leaders {
            if used.contains(&lead.key) || lead.key == seeker.key {
                continue;
            }
            let dist = raw_distance(&seeker.preference, &lead.preference);
            if dist < best_dist {
                best_dist = dist;
                best = Some(lead);
                if dist.is_perfect() {
                    break;
                }
            }
        }

        if let Some(lead) = best {
            pairings.push(pair_of(&seeker.signup, Some(&lead.signup)));
            used.insert(seeker.key.clone());
            used.insert(lead.key.clone());
        }
    }

    used
}

fn find_partner(
    candidates: &[Candidate],
    i: usize,
    used: &HashSet<String>,
    recent: &RecentOpponents,
    system: GameSystem,
    admit_recent: bool,
) -> Option<usize> {
    let current = &candidates[i];
    let mut best_j = None;
    let mut best_dist = PairDistance::WORST;

    for (j, other) in candidates.iter().enumerate().skip(i + 1) {
        if used.contains(&other.key) {
            continue;
        }
        if !admit_recent && recent.contains(&current.key, &other.key) {
            continue;
        }
        let dist = pair_distance(
            &current.signup,
            &current.preference,
            &other.signup,
            &other.preference,
            system,
        );
        if dist < best_dist {
            best_dist = dist;
            best_j = Some(j);
            if dist.is_perfect() {
                break;
            }
        }
    }

    best_j
}

fn pair_of(a: &Signup, b: Option<&Signup>) -> NewPairing {
    NewPairing {
        a_signup_id: a.id,
        b_signup_id: b.map(|s| s.id),
        a_faction: a.details.faction.clone(),
        b_faction: b.and_then(|s| s.details.faction.clone()),
    }
}
