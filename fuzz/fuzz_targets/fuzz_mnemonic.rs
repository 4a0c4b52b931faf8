#![no_main]

use aptkit::Account;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = Account::from_mnemonic(data);

    let normalized = data.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Ok(account) = Account::from_mnemonic(&normalized) {
        let again = Account::from_mnemonic(&normalized).expect("accepted phrase must derive twice");
        assert_eq!(again.address(), account.address());
    }
});
