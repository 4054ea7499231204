mod common;

use common::{Effect, FakeBrowser, init_tracing};
use std::time::Duration;
use wayfind_engine::CheckError;
use wayfind_engine::backend::Backend;
use wayfind_engine::navigation::{NavigationPath, Navigator, NavigatorOptions, Origin};
use wayfind_engine::protocol::{ContextId, ElementHandle};
use wayfind_engine::resolution::{Candidates, Resolver};

const ORIGIN: &str = "https://shop.test/inventory.html";

fn navigator() -> Navigator {
    Navigator::new(NavigatorOptions {
        timeout: Duration::from_secs(10),
        poll_interval: Duration::from_millis(250),
        restore_address: true,
    })
}

fn page_with_link(effects: Vec<Effect>) -> (FakeBrowser, ElementHandle) {
    let mut browser = FakeBrowser::new(ORIGIN);
    let link = browser.element("#about_sidebar_link", "About");
    for effect in effects {
        browser.on_click(&link, effect);
    }
    (browser, link)
}

fn assert_origin_restored(browser: &FakeBrowser) {
    assert_eq!(browser.context_ids(), vec![ContextId::new("ctx-0")]);
    assert_eq!(browser.active(), Some(ContextId::new("ctx-0")));
}

#[tokio::test(start_paused = true)]
async fn test_link_opening_new_context() {
    init_tracing();
    let (mut browser, link) = page_with_link(vec![Effect::OpenContext {
        url: "https://x.com/foo".into(),
    }]);

    let report = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "x.com",
        )
        .await
        .unwrap();

    assert_eq!(
        report.path,
        NavigationPath::NewContext {
            context: ContextId::new("ctx-1")
        }
    );
    assert_eq!(report.address, "https://x.com/foo");
    assert_origin_restored(&browser);
    assert!(browser.navigations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_new_context_redirect_matches_case_insensitively() {
    let (mut browser, link) = page_with_link(vec![Effect::OpenRedirecting {
        initial: "about:blank".into(),
        url: "https://www.SauceLabs.com/".into(),
        after: Duration::from_millis(1500),
    }]);

    let report = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap();

    assert_eq!(report.address, "https://www.SauceLabs.com/");
    assert!(report.elapsed >= Duration::from_millis(1500));
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_same_context_navigation_is_restored() {
    let (mut browser, link) = page_with_link(vec![Effect::Navigate {
        url: "https://saucelabs.com/".into(),
    }]);

    let report = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap();

    assert_eq!(report.path, NavigationPath::SameContext);
    assert_eq!(report.address, "https://saucelabs.com/");
    assert_origin_restored(&browser);
    assert_eq!(browser.navigations, vec![ORIGIN.to_string()]);
    assert_eq!(browser.current_url().await.unwrap(), ORIGIN);
}

#[tokio::test(start_paused = true)]
async fn test_address_restore_can_be_disabled() {
    let (mut browser, link) = page_with_link(vec![Effect::Navigate {
        url: "https://saucelabs.com/".into(),
    }]);
    let navigator = Navigator::new(NavigatorOptions {
        restore_address: false,
        ..NavigatorOptions::default()
    });

    navigator
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap();

    assert!(browser.navigations.is_empty());
    assert_eq!(browser.current_url().await.unwrap(), "https://saucelabs.com/");
}

#[tokio::test(start_paused = true)]
async fn test_several_new_contexts_are_ambiguous() {
    let (mut browser, link) = page_with_link(vec![
        Effect::OpenContext {
            url: "https://saucelabs.com/".into(),
        },
        Effect::OpenContext {
            url: "https://ads.test/".into(),
        },
    ]);

    let err = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap_err();

    match err {
        CheckError::AmbiguousNewContext { contexts } => assert_eq!(contexts.len(), 2),
        other => panic!("expected AmbiguousNewContext, got {:?}", other),
    }
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_domain_fails_and_still_restores() {
    let (mut browser, link) = page_with_link(vec![Effect::OpenContext {
        url: "https://elsewhere.test/".into(),
    }]);

    let err = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap_err();

    match err {
        CheckError::DomainMismatch { actual, expected } => {
            assert_eq!(actual, "https://elsewhere.test/");
            assert_eq!(expected, "saucelabs.com");
        }
        other => panic!("expected DomainMismatch, got {:?}", other),
    }
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_dead_link_reports_no_navigation() {
    let (mut browser, link) = page_with_link(Vec::new());

    let started = tokio::time::Instant::now();
    let err = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap_err();

    assert_eq!(started.elapsed(), Duration::from_secs(10));
    match err {
        CheckError::NoNavigationOccurred { address, elapsed } => {
            assert_eq!(address, ORIGIN);
            assert_eq!(elapsed, Duration::from_secs(10));
        }
        other => panic!("expected NoNavigationOccurred, got {:?}", other),
    }
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_failing_trigger_still_closes_spawned_context() {
    let (mut browser, link) = page_with_link(vec![Effect::OpenContext {
        url: "https://saucelabs.com/".into(),
    }]);

    let err = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Err(CheckError::TimedOut {
                        waiting_for: "menu animation".into(),
                        elapsed: Duration::from_secs(1),
                    })
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::TimedOut { .. }));
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_click_through_resolves_fallback_link() {
    let (mut browser, _) = page_with_link(vec![Effect::OpenContext {
        url: "https://saucelabs.com/".into(),
    }]);
    let link = Candidates::parse(&["link=About Us", "#about_sidebar_link"]).unwrap();

    let report = navigator()
        .click_through(&mut browser, &Resolver::default(), &link, "saucelabs.com")
        .await
        .unwrap();

    assert!(matches!(report.path, NavigationPath::NewContext { .. }));
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_click_through_missing_link_is_not_found() {
    let mut browser = FakeBrowser::new(ORIGIN);
    let link = Candidates::parse(&["#about_sidebar_link"]).unwrap();

    let err = navigator()
        .click_through(
            &mut browser,
            &Resolver::default().with_timeout(Duration::from_secs(1)),
            &link,
            "saucelabs.com",
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_hash_link_that_opens_tab_later_uses_new_context() {
    let (mut browser, link) = page_with_link(vec![
        Effect::Navigate {
            url: format!("{}#", ORIGIN),
        },
        Effect::Delayed(
            Duration::from_millis(500),
            Box::new(Effect::OpenContext {
                url: "https://x.com/foo".into(),
            }),
        ),
    ]);

    let report = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "x.com",
        )
        .await
        .unwrap();

    assert_eq!(
        report.path,
        NavigationPath::NewContext {
            context: ContextId::new("ctx-1")
        }
    );
    assert_eq!(report.address, "https://x.com/foo");
    assert_origin_restored(&browser);
    assert_eq!(browser.current_url().await.unwrap(), ORIGIN);
}

#[tokio::test(start_paused = true)]
async fn test_same_context_redirect_chain_reaches_domain() {
    let (mut browser, link) = page_with_link(vec![
        Effect::Navigate {
            url: "https://sso.test/login?next=saucelabs".into(),
        },
        Effect::Delayed(
            Duration::from_millis(800),
            Box::new(Effect::Navigate {
                url: "https://saucelabs.com/".into(),
            }),
        ),
    ]);

    let report = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap();

    assert_eq!(report.path, NavigationPath::SameContext);
    assert_eq!(report.address, "https://saucelabs.com/");
    assert!(report.elapsed >= Duration::from_millis(800));
    assert_origin_restored(&browser);
}

#[tokio::test(start_paused = true)]
async fn test_same_context_wrong_domain_waits_full_budget() {
    let (mut browser, link) = page_with_link(vec![Effect::Navigate {
        url: "https://elsewhere.test/".into(),
    }]);

    let started = tokio::time::Instant::now();
    let err = navigator()
        .with_external_navigation(
            &mut browser,
            move |b| {
                Box::pin(async move {
                    b.click(&link).await?;
                    Ok(())
                })
            },
            "saucelabs.com",
        )
        .await
        .unwrap_err();

    assert_eq!(started.elapsed(), Duration::from_secs(10));
    match err {
        CheckError::DomainMismatch { actual, expected } => {
            assert_eq!(actual, "https://elsewhere.test/");
            assert_eq!(expected, "saucelabs.com");
        }
        other => panic!("expected DomainMismatch, got {:?}", other),
    }
    assert_origin_restored(&browser);
    assert_eq!(browser.navigations, vec![ORIGIN.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_restore_reselects_origin_when_listing_fails() {
    let (mut browser, link) = page_with_link(vec![Effect::OpenContext {
        url: "https://saucelabs.com/".into(),
    }]);

    let origin = Origin::capture(&mut browser).await.unwrap();
    browser.click(&link).await.unwrap();
    browser.switch_to(&ContextId::new("ctx-1")).await.unwrap();
    browser.break_context_listing();

    let err = origin.restore(&mut browser, true).await.unwrap_err();

    assert!(matches!(err, CheckError::Backend(_)));
    assert_eq!(browser.active(), Some(ContextId::new("ctx-0")));
}
