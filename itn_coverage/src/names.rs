/*!
Reconciliation of free-text chiefdom names with the names of the boundary dataset.

The survey enumerators type the chiefdom by hand, so the same place comes in
several spellings ("Bo City", "bo city", "Bo City Council"). The alias table
maps the known spellings to the canonical boundary name, and [resolve] applies
a layered policy on top of it:

1. exact match on a key,
2. case-insensitive match on a key,
3. case-insensitive substring match, in either direction,
4. otherwise the trimmed input is returned unchanged.

```
use itn_coverage::names::{resolve, AliasTable};

let table = AliasTable::default_chiefdoms();
assert_eq!(resolve(Some("Bo City"), &table), Some("BO TOWN".to_string()));
assert_eq!(resolve(Some("  bargbo "), &table), Some("BAGBO".to_string()));
assert_eq!(resolve(Some("Unknown Place"), &table), Some("Unknown Place".to_string()));
assert_eq!(resolve(None, &table), None);
```
*/

use log::debug;

/// How a name was resolved.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    Substring,
    /// No alias matched, the name is kept as written.
    PassThrough,
}

/// Which alias wins when several keys match as substrings.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SubstringTieBreak {
    /// The first matching entry, in the order the table was built.
    TableOrder,
    /// The longest matching key. Equal lengths fall back to the table order.
    LongestKey,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct AliasEntry {
    key: String,
    key_upper: String,
    canonical: String,
}

/// The mapping from survey spellings to canonical boundary names.
///
/// The order of insertion is kept: it decides the substring matches. Several
/// spellings may point to the same canonical name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    tie_break: SubstringTieBreak,
}

impl Default for AliasTable {
    fn default() -> Self {
        AliasTable::new()
    }
}

impl AliasTable {
    pub fn new() -> AliasTable {
        AliasTable {
            entries: Vec::new(),
            tie_break: SubstringTieBreak::TableOrder,
        }
    }

    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> AliasTable
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = AliasTable::new();
        for (k, v) in pairs {
            table.insert(k.as_ref(), v.as_ref());
        }
        table
    }

    /// The chiefdoms of BO and BOMBALI, as spelled in the survey and in the
    /// 2021 chiefdom boundaries.
    pub fn default_chiefdoms() -> AliasTable {
        AliasTable::from_pairs(&[
            // BO
            ("Bo City", "BO TOWN"),
            ("Badjia", "BADJIA"),
            ("Bargbo", "BAGBO"),
            ("Bagbwe", "BAGBWE(BAGBE)"),
            ("Baoma", "BOAMA"),
            ("Bongor", "BONGOR"),
            ("Bumpeh", "BUMPE NGAO"),
            ("Gbo", "GBO"),
            ("Jaiama", "JAIAMA"),
            ("Kakua", "KAKUA"),
            ("Komboya", "KOMBOYA"),
            ("Lugbu", "LUGBU"),
            ("Niawa Lenga", "NIAWA LENGA"),
            ("Selenga", "SELENGA"),
            ("Tinkoko", "TIKONKO"),
            ("Valunia", "VALUNIA"),
            ("Wonde", "WONDE"),
            // BOMBALI
            ("Biriwa", "BIRIWA"),
            ("Bombali Sebora", "BOMBALI SEBORA"),
            ("Bombali Serry", "BOMBALI SIARI"),
            ("Gbanti (Bombali)", "GBANTI"),
            ("Gbanti", "GBANTI"),
            ("Gbendembu", "GBENDEMBU"),
            ("Kamaranka", "KAMARANKA"),
            ("Magbaimba Ndohahun", "MAGBAIMBA NDORWAHUN"),
            ("Makarie", "MAKARI"),
            ("Mara", "MARA"),
            ("Ngowahun", "N'GOWAHUN"),
            ("Paki Masabong", "PAKI MASABONG"),
            ("Safroko Limba", "SAFROKO LIMBA"),
            ("Makeni City", "MAKENI CITY"),
        ])
    }

    pub fn with_tie_break(mut self, tie_break: SubstringTieBreak) -> AliasTable {
        self.tie_break = tie_break;
        self
    }

    pub fn tie_break(&self) -> SubstringTieBreak {
        self.tie_break
    }

    /// Adds an alias. Re-inserting an existing key replaces its canonical name
    /// but keeps its position.
    pub fn insert(&mut self, key: &str, canonical: &str) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.key == key) {
            e.canonical = canonical.to_string();
            return;
        }
        self.entries.push(AliasEntry {
            key: key.to_string(),
            key_upper: key.to_uppercase(),
            canonical: canonical.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.canonical.as_str()))
    }

    /// The distinct canonical names, in table order.
    pub fn canonical_names(&self) -> Vec<&str> {
        let mut res: Vec<&str> = Vec::new();
        for e in self.entries.iter() {
            if !res.contains(&e.canonical.as_str()) {
                res.push(e.canonical.as_str());
            }
        }
        res
    }

    fn substring_match(&self, name_upper: &str) -> Option<&AliasEntry> {
        let candidates: Vec<&AliasEntry> = self
            .entries
            .iter()
            .filter(|e| e.key_upper.contains(name_upper) || name_upper.contains(&e.key_upper))
            .collect();
        if candidates.len() > 1 {
            debug!(
                "substring_match: {:?} matches {} aliases: {:?}",
                name_upper,
                candidates.len(),
                candidates.iter().map(|e| &e.key).collect::<Vec<_>>()
            );
        }
        match self.tie_break {
            SubstringTieBreak::TableOrder => candidates.first().copied(),
            SubstringTieBreak::LongestKey => {
                // max_by_key returns the last maximum, the table order wants the first one.
                let mut best: Option<&AliasEntry> = None;
                for e in candidates {
                    if best.map(|b| e.key.len() > b.key.len()).unwrap_or(true) {
                        best = Some(e);
                    }
                }
                best
            }
        }
    }
}

/// Resolves a name and reports how it was matched.
///
/// The input is trimmed first. A name that is empty after trimming is passed
/// through as `""`, instead of substring-matching the first key of the table
/// as a literal substring rule would.
pub fn resolve_detailed(raw_name: &str, table: &AliasTable) -> (String, MatchKind) {
    let name = raw_name.trim();
    if name.is_empty() {
        return (String::new(), MatchKind::PassThrough);
    }

    if let Some(e) = table.entries.iter().find(|e| e.key == name) {
        return (e.canonical.clone(), MatchKind::Exact);
    }

    let name_upper = name.to_uppercase();
    if let Some(e) = table.entries.iter().find(|e| e.key_upper == name_upper) {
        return (e.canonical.clone(), MatchKind::CaseInsensitive);
    }

    if let Some(e) = table.substring_match(&name_upper) {
        debug!(
            "resolve: {:?} -> {:?} (substring of alias {:?})",
            name, e.canonical, e.key
        );
        return (e.canonical.clone(), MatchKind::Substring);
    }

    (name.to_string(), MatchKind::PassThrough)
}

/// Resolves a free-text chiefdom name to its canonical boundary name.
///
/// `None` stays `None`. Unknown names come back trimmed but otherwise unchanged.
pub fn resolve(raw_name: Option<&str>, table: &AliasTable) -> Option<String> {
    raw_name.map(|n| resolve_detailed(n, table).0)
}
