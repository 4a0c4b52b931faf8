#![no_main]

use aptkit::Account;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct KeyInput<'a> {
    raw: &'a [u8],
    hex: &'a str,
    message: &'a [u8],
}

fuzz_target!(|input: KeyInput| {
    let _ = Account::from_private_key_hex(input.hex);

    if let Ok(account) = Account::from_private_key_bytes(input.raw) {
        let signature = account.sign(input.message);
        assert!(account.verify(input.message, &signature));

        let imported = Account::from_private_key_hex(&account.private_key_hex()).expect("exported key must import");
        assert_eq!(imported.address(), account.address());
    }
});
