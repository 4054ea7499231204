//! Checks against the Sauce Labs demo store.
//!
//! Selectors come with fallbacks because the store ships several markup
//! variants (`id` on some builds, `data-test` on others).

use async_trait::async_trait;
use wayfind_engine::CheckError;
use wayfind_engine::backend::Backend;
use wayfind_engine::ordering::{ListProbe, OrderVerifier, Relation};
use wayfind_engine::resolution::Candidates;
use wayfind_engine::scenario::{Outcome, Scenario, Session, Suite};

pub const LOGIN: &str = "login";

/// The demo-store suite: log in, two sort checks and the "About" link.
pub fn suite<B: Backend + 'static>() -> Suite<B> {
    Suite::new("saucedemo")
        .with(Login)
        .with(SortByNameDescending)
        .with(SortByPriceAscending)
        .with(AboutLinkOpensVendor)
}

fn candidates(selectors: &[&str]) -> Result<Candidates, CheckError> {
    Candidates::parse(selectors)
}

fn inventory_url(base_url: &str) -> String {
    format!("{}/inventory.html", base_url.trim_end_matches('/'))
}

/// Pick `option` in the sort dropdown and check `list` ends up in `relation` order.
async fn check_sort<B: Backend>(
    session: &mut Session<B>,
    verifier: &OrderVerifier,
    option: &[&str],
    list: &[&str],
    relation: Relation,
) -> Result<(), CheckError> {
    let inventory = inventory_url(&session.settings.suite.base_url);
    session.open(&inventory).await?;

    let dropdown = candidates(&[
        "css=select[data-test='product-sort-container']",
        ".product_sort_container",
    ])?;
    session.resolve(&dropdown).await?;

    let option = candidates(option)?;
    let probe = ListProbe::text(candidates(list)?);
    let resolver = session.resolver.clone();

    verifier
        .verify_reorder(
            &mut session.backend,
            &probe,
            move |b| {
                Box::pin(async move {
                    let choice = resolver.resolve(b, &option).await?;
                    b.click(&choice.element).await?;
                    Ok(())
                })
            },
            &probe,
            relation,
        )
        .await?;
    Ok(())
}

pub struct Login;

#[async_trait]
impl<B: Backend> Scenario<B> for Login {
    fn name(&self) -> &str {
        LOGIN
    }

    async fn run(&self, session: &mut Session<B>) -> Outcome {
        let result = async {
            let suite = session.settings.suite.clone();
            session.open(&suite.base_url).await?;

            let user = candidates(&["id=user-name", "css=input[data-test='username']"])?;
            let password = candidates(&["id=password", "css=input[data-test='password']"])?;
            let submit = candidates(&["id=login-button", "css=input[type='submit']"])?;
            session.type_into(&user, &suite.username).await?;
            session.type_into(&password, &suite.password).await?;
            session.click(&submit).await?;

            session
                .resolve(&candidates(&[".inventory_list", "id=inventory_container"])?)
                .await
        }
        .await;
        Outcome::from_result(result)
    }
}

pub struct SortByNameDescending;

#[async_trait]
impl<B: Backend> Scenario<B> for SortByNameDescending {
    fn name(&self) -> &str {
        "sort by name (Z to A)"
    }

    fn depends_on(&self) -> &[&str] {
        &[LOGIN]
    }

    async fn run(&self, session: &mut Session<B>) -> Outcome {
        let verifier = session.verifier.clone();
        let result = check_sort(
            session,
            &verifier,
            &[
                "css=.product_sort_container option[value='za']",
                "xpath=//select/option[normalize-space(.)='Name (Z to A)']",
            ],
            &[".inventory_item_name", "css=[data-test='inventory-item-name']"],
            Relation::Descending,
        )
        .await;
        Outcome::skip_when_absent(result, "no sort control on this page")
    }
}

pub struct SortByPriceAscending;

#[async_trait]
impl<B: Backend> Scenario<B> for SortByPriceAscending {
    fn name(&self) -> &str {
        "sort by price (low to high)"
    }

    fn depends_on(&self) -> &[&str] {
        &[LOGIN]
    }

    async fn run(&self, session: &mut Session<B>) -> Outcome {
        let verifier = session.price_verifier();
        let result = check_sort(
            session,
            &verifier,
            &[
                "css=.product_sort_container option[value='lohi']",
                "xpath=//select/option[contains(., 'low to high')]",
            ],
            &[".inventory_item_price", "css=[data-test='inventory-item-price']"],
            Relation::Ascending,
        )
        .await;
        Outcome::skip_when_absent(result, "no sort control on this page")
    }
}

pub struct AboutLinkOpensVendor;

#[async_trait]
impl<B: Backend> Scenario<B> for AboutLinkOpensVendor {
    fn name(&self) -> &str {
        "about link opens vendor site"
    }

    fn depends_on(&self) -> &[&str] {
        &[LOGIN]
    }

    async fn run(&self, session: &mut Session<B>) -> Outcome {
        let result = async {
            let suite = session.settings.suite.clone();
            session.open(&inventory_url(&suite.base_url)).await?;

            let menu = candidates(&["id=react-burger-menu-btn", "css=button[aria-label='Open Menu']"])?;
            session.click(&menu).await?;

            let about = candidates(&["id=about_sidebar_link", "link=About", "partial-link=About"])?;
            let visible = session.resolver.visible();
            session
                .navigator
                .click_through(&mut session.backend, &visible, &about, &suite.about_domain)
                .await
        }
        .await;
        Outcome::skip_when_absent(result, "no About link in the menu")
    }
}
