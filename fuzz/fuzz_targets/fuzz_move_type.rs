#![no_main]

use aptkit::{AccountAddress, EntryFunctionId, MoveType, TypeTag};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsers must reject, never panic
    let _ = data.parse::<AccountAddress>();
    let _ = data.parse::<EntryFunctionId>();
    let _ = data.parse::<TypeTag>();

    if let Ok(parsed) = data.parse::<MoveType>() {
        let reparsed: MoveType = parsed.to_string().parse().expect("display must reparse");
        assert_eq!(parsed, reparsed);
        let _ = MoveType::coin_store(&parsed);
    }
});
