use std::sync::Arc;

use alloy_primitives::U256;
use eyre::{bail, eyre, WrapErr};
use tracing::info;

use subscription_client::contracts::subscription_cost;
use subscription_client::fetchers::{ContentAccess, CreatorView, Fetcher, TierView};
use subscription_client::utils::{format_ether, parse_ether, shorten_address};
use subscription_client::{ClientConfig, HttpProvider, SessionManager};

const USAGE: &str = "usage: subscription-client <command>

commands:
  creators                              list registered creators
  creator <id>                          show a creator and their tiers
  tiers                                 show the tiers of your creator profile
  dashboard                             show your subscriptions
  register <metadata-uri>               register as a creator
  create-tier <name> <uri> <price-eth>  add a monthly tier
  subscribe <creator> <tier> <months>   subscribe to a creator's tier
  cancel <subscription>                 cancel a subscription
  mint <tier> <content-uri>             publish content gated by one of your tiers
  feed <creator>                        list a creator's content
  content <token>                       open a content token
  analytics                             show subscriber stats for your profile";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("subscription_client=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = Arc::new(ClientConfig::load()?);
    let provider = Arc::new(HttpProvider::new(
        config.provider.rpc_url.clone(),
        config.call_timeout(),
    )?);
    let _watcher = provider.spawn_watcher(config.provider.poll_interval());

    let manager = SessionManager::new(Some(Arc::clone(&provider)), Arc::clone(&config));
    let mut session = manager.try_restore_session().await?;
    if !session.is_connected() {
        session = manager.connect().await?;
    }
    if let Some(warning) = &session.last_error {
        println!("warning: {warning}");
    }
    if let Some(address) = session.address {
        info!(account = %shorten_address(&address), chain_id = ?session.chain_id, "connected");
    }

    let contracts = manager.contracts().await?;
    let fetcher = Fetcher::from_config(Arc::clone(&contracts), &config)?;

    match (command, &args[1..]) {
        ("creators", []) => {
            let creators = fetcher.load_creators().await?;
            if creators.is_empty() {
                println!("no creators registered");
            }
            for creator in &creators {
                print_creator(creator);
            }
        }
        ("creator", [id]) => {
            let page = fetcher.load_creator_page(parse_id(id)?).await?;
            print_creator(&page.creator);
            if !page.creator.description.is_empty() {
                println!("    {}", page.creator.description);
            }
            for tier in &page.tiers {
                print_tier(tier);
            }
        }
        ("tiers", []) => {
            for tier in fetcher.load_my_tiers().await? {
                print_tier(&tier);
            }
        }
        ("dashboard", []) => {
            let dashboard = fetcher.load_dashboard().await?;
            println!(
                "{}: {} subscriptions, {} active",
                shorten_address(&dashboard.account),
                dashboard.subscriptions.len(),
                dashboard.active_count()
            );
            for subscription in &dashboard.subscriptions {
                println!(
                    "  #{} {} tier {} {:?} paid {} ETH",
                    subscription.id,
                    subscription.creator_name,
                    subscription.tier_id,
                    subscription.status,
                    subscription.amount_display
                );
            }
            if let Some(profile) = &dashboard.creator_profile {
                println!("creator profile:");
                print_creator(profile);
            }
        }
        ("register", [uri]) => {
            let receipt = contracts.creator_registry.register_creator(uri).await?;
            println!("registered in block {} ({})", receipt.block_number, receipt.tx_hash);
        }
        ("create-tier", [name, uri, price]) => {
            let price = parse_ether(price)?;
            let receipt = contracts.content_nft.create_tier(name, uri, price).await?;
            println!("tier created in block {} ({})", receipt.block_number, receipt.tx_hash);
        }
        ("subscribe", [creator, tier, months]) => {
            let creator_id = parse_id(creator)?;
            let tier_id = parse_id(tier)?;
            let months: u64 = months
                .parse()
                .wrap_err_with(|| format!("invalid month count {months:?}"))?;
            let tier = contracts.content_nft.get_tier(creator_id, tier_id).await?;
            let cost = subscription_cost(tier.price, months)?;
            println!("paying {} ETH for {months} month(s) of {}", format_ether(cost), tier.name);
            let receipt = contracts
                .subscription_manager
                .subscribe(creator_id, tier_id, months, tier.price)
                .await?;
            println!("subscribed in block {} ({})", receipt.block_number, receipt.tx_hash);
        }
        ("cancel", [subscription]) => {
            let receipt = contracts
                .subscription_manager
                .cancel_subscription(parse_id(subscription)?)
                .await?;
            println!("cancelled in block {} ({})", receipt.block_number, receipt.tx_hash);
        }
        ("mint", [tier, uri]) => {
            let receipt = contracts.content_nft.mint_content(parse_id(tier)?, uri).await?;
            println!("content minted in block {} ({})", receipt.block_number, receipt.tx_hash);
        }
        ("feed", [creator]) => {
            let feed = fetcher.load_content_feed(parse_id(creator)?).await?;
            print_creator(&feed.creator);
            println!("  {} items, {} unlocked", feed.items.len(), feed.unlocked_count());
            for item in &feed.items {
                println!(
                    "  token {} tier {} {}",
                    item.token_id,
                    item.tier_id,
                    describe_access(&item.access)
                );
            }
        }
        ("content", [token]) => {
            let page = fetcher.load_content(parse_id(token)?).await?;
            println!(
                "token {} tier {} {}",
                page.token_id,
                page.tier_id,
                describe_access(&page.access)
            );
        }
        ("analytics", []) => {
            let analytics = fetcher.load_creator_analytics().await?;
            print_creator(&analytics.creator);
            println!(
                "  {} active, {} new in the last 30 days ({:.1}%)",
                analytics.active_subscriptions,
                analytics.recent_subscriptions,
                analytics.growth_rate()
            );
            for tier in &analytics.tiers {
                let count = tier
                    .subscriber_count
                    .map_or_else(|| "?".to_string(), |count| count.to_string());
                println!(
                    "  tier {} {} {} ETH/month, {count} subscribers",
                    tier.tier_id, tier.name, tier.price_display
                );
            }
            for point in &analytics.history {
                println!(
                    "  #{} tier {} paid {} ETH at {}",
                    point.subscription_id, point.tier_id, point.amount_display, point.start_time
                );
            }
        }
        _ => bail!("unrecognised command\n\n{USAGE}"),
    }

    Ok(())
}

fn parse_id(raw: &str) -> eyre::Result<U256> {
    raw.parse::<U256>()
        .map_err(|e| eyre!("invalid id {raw:?}: {e}"))
}

fn print_creator(creator: &CreatorView) {
    let verified = if creator.is_verified { " (verified)" } else { "" };
    println!(
        "#{} {}{} {} subscribers, {} ETH earned",
        creator.id, creator.name, verified, creator.total_subscribers, creator.earnings_display
    );
}

fn print_tier(tier: &TierView) {
    let access = match tier.has_access {
        Some(true) => " [subscribed]",
        _ => "",
    };
    println!("  tier {} {} {} ETH/month{}", tier.id, tier.name, tier.price_display, access);
    for feature in &tier.features {
        println!("    - {feature}");
    }
}

fn describe_access(access: &ContentAccess) -> String {
    match access {
        ContentAccess::Unlocked { url, .. } => url.clone(),
        ContentAccess::Locked => "locked, subscribe to the tier to open".to_string(),
    }
}
