use tradepro::model::Ticker;
use tradepro::storage::{subscriptions_key, FileStore, KeyValueStore};
use tradepro::Session;

#[test]
fn identity_switch_scenario_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = Session::open_dir(dir.path()).expect("open session");

    session.login("a@x.com").unwrap();
    assert_eq!(session.toggle_subscription("TSLA").unwrap(), Some(true));
    assert!(session.is_subscribed("TSLA"));
    session.logout().unwrap();

    session.login("b@x.com").unwrap();
    assert!(!session.is_subscribed("TSLA"));
    session.logout().unwrap();

    session.login("a@x.com").unwrap();
    assert!(session.is_subscribed("TSLA"));
}

#[test]
fn state_survives_reopening_the_data_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let session = Session::open_dir(dir.path()).expect("open session");
        session.login("a@x.com").unwrap();
        for ticker in [Ticker::Nvda, Ticker::Goog, Ticker::Meta] {
            session.toggle_subscription(ticker.symbol()).unwrap();
        }
        session.toggle_subscription("GOOG").unwrap();
    }

    let reopened = Session::open_dir(dir.path()).expect("reopen session");
    assert_eq!(
        reopened.current_user().map(|identity| identity.email),
        Some("a@x.com".to_string())
    );
    assert_eq!(
        reopened.subscribed_symbols(),
        vec!["NVDA".to_string(), "META".to_string()]
    );
}

#[test]
fn logged_out_toggle_leaves_disk_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = Session::open_dir(dir.path()).expect("open session");
    session.login("a@x.com").unwrap();
    session.toggle_subscription("AMZN").unwrap();
    session.logout().unwrap();

    let before = std::fs::read(dir.path().join("store.json")).expect("store file");
    assert_eq!(session.toggle_subscription("GOOG").unwrap(), None);
    let after = std::fs::read(dir.path().join("store.json")).expect("store file");

    assert_eq!(before, after);
    assert!(!session.is_subscribed("GOOG"));
}

#[test]
fn reset_wipes_every_user() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = Session::open_dir(dir.path()).expect("open session");
    for email in ["a@x.com", "b@x.com"] {
        session.login(email).unwrap();
        session.toggle_subscription("GOOG").unwrap();
    }

    session.reset_all_data().unwrap();

    let store = FileStore::open(dir.path()).expect("reopen store");
    assert!(store.get(&subscriptions_key("a@x.com")).is_none());
    assert!(store.get(&subscriptions_key("b@x.com")).is_none());
    assert!(Session::open_dir(dir.path()).unwrap().current_user().is_none());
}
