use proptest::prelude::*;

use goc_types::{AccountName, Asset, BlockTimestamp, Symbol, Timestamp};

const SYS: Symbol = Symbol::from_static(4, "SYS");

proptest! {
    /// Any normal-form name survives a string round trip.
    #[test]
    fn name_string_roundtrip(s in "[a-z1-5]{1,12}") {
        let name: AccountName = s.parse().unwrap();
        prop_assert_eq!(name.to_string(), s);
    }

    /// Name ordering agrees with raw value ordering.
    #[test]
    fn name_ordering_matches_raw(a in "[a-z1-5]{1,12}", b in "[a-z1-5]{1,12}") {
        let na: AccountName = a.parse().unwrap();
        let nb: AccountName = b.parse().unwrap();
        prop_assert_eq!(na < nb, na.raw() < nb.raw());
    }

    /// The suffix of a dotted name is the last segment.
    #[test]
    fn suffix_is_last_segment(head in "[a-z]{1,4}", tail in "[a-z]{1,6}") {
        let full: AccountName = format!("{head}.{tail}").parse().unwrap();
        let tail_name: AccountName = tail.parse().unwrap();
        prop_assert_eq!(full.suffix(), tail_name);
    }

    /// Asset display parses back to the same quantity.
    #[test]
    fn asset_display_parses(amount in -1_000_000_000_000i64..1_000_000_000_000) {
        let asset = Asset::new(amount, SYS);
        let parsed: Asset = asset.to_string().parse().unwrap();
        prop_assert_eq!(parsed, asset);
    }

    /// Timestamp has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired(base in 0u64..1_000_000, dur in 0u64..1_000_000, now in 0u64..3_000_000) {
        let t = Timestamp::new(base);
        prop_assert_eq!(t.has_expired(dur, Timestamp::new(now)), now >= base + dur);
    }

    /// Block slots are monotonic in wall-clock time.
    #[test]
    fn block_slots_monotonic(a in 946_684_800u64..2_000_000_000, d in 0u64..1_000_000) {
        let sa = BlockTimestamp::from_timestamp(Timestamp::new(a));
        let sb = BlockTimestamp::from_timestamp(Timestamp::new(a + d));
        prop_assert!(sb >= sa);
        prop_assert_eq!(sb.slots_since(sa) as u64, 2 * d);
    }
}
