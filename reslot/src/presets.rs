use treasure_rs::io::{ParsedRecords, parse_records};

/// A preset record file shipped with the binary
#[derive(Clone, Copy, Debug)]
pub struct BundledPreset {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub records: &'static str,
}

pub const BUNDLED_PRESETS: [BundledPreset; 4] = [
    BundledPreset {
        name: "Base Game w/Merchant + DLC",
        aliases: &["bmd", "base_game_merchant_dlc"],
        records: include_str!("../assets/presets/base_game_merchant_dlc.txt"),
    },
    BundledPreset {
        name: "Base Game + DLC",
        aliases: &["bd", "base_game_dlc"],
        records: include_str!("../assets/presets/base_game_dlc.txt"),
    },
    BundledPreset {
        name: "Base Game w/Merchant",
        aliases: &["bm", "base_game_merchant"],
        records: include_str!("../assets/presets/base_game_merchant.txt"),
    },
    BundledPreset {
        name: "Base Game",
        aliases: &["b", "base_game"],
        records: include_str!("../assets/presets/base_game.txt"),
    },
];

impl BundledPreset {
    /// Looks up a bundled preset by name or alias, ignoring case
    pub fn find(name: &str) -> Option<&'static BundledPreset> {
        let name = name.trim();
        BUNDLED_PRESETS.iter().find(|p| {
            p.name.eq_ignore_ascii_case(name) || p.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    pub fn parse(&self) -> ParsedRecords {
        parse_records(self.records)
    }
}

#[cfg(test)]
mod tests {
    use treasure_rs::entities::fits_capacity;
    use treasure_rs::pricing::PriceModel;

    use super::*;

    #[test]
    fn bundled_presets_are_clean() {
        let model = PriceModel::default();
        for preset in BUNDLED_PRESETS.iter() {
            let parsed = preset.parse();
            assert!(parsed.errors.is_empty(), "{}: {:?}", preset.name, parsed.errors);
            assert!(!parsed.records.is_empty());
            for r in parsed.records.iter() {
                assert!(fits_capacity(r.treasure, &r.gems));
                let computed = model.evaluate(r.treasure, &r.gems).final_price;
                assert_eq!(r.reference_price, Some(computed), "{}: line {}", preset.name, r.line);
            }
        }
    }

    #[test]
    fn lookup_by_name_or_alias() {
        assert_eq!(BundledPreset::find("BMD").map(|p| p.name), Some("Base Game w/Merchant + DLC"));
        assert_eq!(BundledPreset::find("base game").map(|p| p.name), Some("Base Game"));
        assert!(BundledPreset::find("new game plus").is_none());
    }
}
