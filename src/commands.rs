use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

use estate_market::api::{ApiError, ListingFilter};
use estate_market::dashboard::{
    confirm, write_listing, AdminBoard, AgentBoard, Board, ClientBoard,
};
use estate_market::models::{
    AgentAccount, Inquiry, Listing, MarketAnalytics, PaymentStatus, Profile, PropertyComparison,
    Role, SavedProperty,
};
use estate_market::store::{Action, AppStore, Notice, Route};
use estate_market::validation::{ensure_role, InquiryDraft, ListingDraft, ListingUpdate, SignUpForm};
use estate_market::SessionContext;

use crate::cli::{
    AgentCommands, Commands, CreateListingArgs, FilterArgs, InquiryCommands, ListingCommands,
    PaymentCommands, SavedCommands, SignupArgs, UpdateListingArgs,
};

pub struct App {
    pub session: SessionContext,
    pub store: Arc<AppStore>,
    pub json: bool,
}

impl App {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    async fn require_user(&self) -> anyhow::Result<Profile> {
        match self.session.init().await? {
            Some(profile) => Ok(profile),
            None => bail!("not signed in, run `estate signin` first"),
        }
    }

    async fn require_role(&self, allowed: &[Role], reason: &str) -> anyhow::Result<Profile> {
        let profile = self.require_user().await?;
        ensure_role(&profile, allowed, reason).map_err(ApiError::Forbidden)?;
        Ok(profile)
    }
}

pub async fn dispatch(command: Commands, app: &App) -> anyhow::Result<()> {
    let api = app.session.api();
    match command {
        Commands::Signup(args) => signup(app, args).await,
        Commands::Signin { email, password } => {
            app.store.open_sign_in();
            let profile = app
                .session
                .sign_in(&email, &password)
                .await
                .context("sign in failed")?
                .context("signed in, but the profile could not be loaded")?;
            app.store.close_modal();
            app.store.dispatch(Action::Navigate(Route::Dashboard));
            app.store.notify(Notice::success(format!("Welcome back, {}", profile.name)));
            app.emit(&profile, || profile_text(&profile))
        }
        Commands::Signout => {
            app.session.logout()?;
            app.store.dispatch(Action::Navigate(Route::Home));
            app.store.notify(Notice::info("Signed out"));
            Ok(())
        }
        Commands::Whoami => {
            let profile = app.require_user().await?;
            app.emit(&profile, || profile_text(&profile))
        }
        Commands::Dashboard => {
            let profile = app.require_user().await?;
            let board = Board::load(api, &profile).await;
            app.store.dispatch(Action::Navigate(Route::Dashboard));
            app.emit(&board, || board.to_string())
        }
        Commands::Listings { action } => listings(app, action).await,
        Commands::Inquiries { action } => inquiries(app, action).await,
        Commands::Saved { action } => saved(app, action).await,
        Commands::Agents { action } => agents(app, action).await,
        Commands::Analytics => {
            app.require_role(&[Role::Admin], "Only admins can view market analytics")
                .await?;
            let stats = api.market_analytics().await?;
            app.emit(&stats, || analytics_text(&stats))
        }
        Commands::Compare { first, second } => {
            let comparison = api.compare_listings(&first, &second).await?;
            app.emit(&comparison, || comparison_text(&comparison))
        }
        Commands::Payments { action } => payments(app, action).await,
    }
}

async fn signup(app: &App, args: SignupArgs) -> anyhow::Result<()> {
    app.store.open_sign_up();
    let form = SignUpForm {
        name: args.name,
        email: args.email,
        password: args.password,
        role: args.role,
        phone: args.phone,
    };
    let receipt = confirm(
        &app.store,
        "Account created, sign in to continue",
        "Sign up failed",
        app.session.sign_up(&form),
    )
    .await?;
    // a new account goes straight to the sign-in form
    app.store.open_sign_in();
    app.emit(&receipt, || {
        receipt
            .message
            .clone()
            .map(|m| format!("{m}\n"))
            .unwrap_or_default()
    })
}

async fn listings(app: &App, action: ListingCommands) -> anyhow::Result<()> {
    let api = app.session.api();
    match action {
        ListingCommands::List => {
            app.require_role(&[Role::Admin], "Only admins can see every listing")
                .await?;
            let listings = api.all_listings().await?;
            app.emit(&listings, || ListingList(&listings).to_string())
        }
        ListingCommands::Approved(args) => {
            let listings = api.approved_listings(&filter_from(args)).await?;
            app.emit(&listings, || ListingList(&listings).to_string())
        }
        ListingCommands::Mine => {
            app.require_role(&[Role::Agent], "Only agents have their own listings")
                .await?;
            let listings = api.agent_listings().await?;
            app.emit(&listings, || ListingList(&listings).to_string())
        }
        ListingCommands::Pending => {
            app.require_role(&[Role::Admin], "Only admins can review pending listings")
                .await?;
            let listings = api.pending_listings().await?;
            app.emit(&listings, || ListingList(&listings).to_string())
        }
        ListingCommands::Show { id } => {
            let listing = api.listing(&id).await?;
            app.emit(&listing, || single(&listing))
        }
        ListingCommands::Create(args) => {
            app.require_role(&[Role::Agent], "Only agents can create listings")
                .await?;
            let draft = draft_from(args);
            let listing = confirm(
                &app.store,
                "Listing submitted for approval",
                "Could not create listing",
                api.create_listing(&draft),
            )
            .await?;
            info!(listing_id = %listing.id, "Listing created");
            app.emit(&listing, || single(&listing))
        }
        ListingCommands::Update(args) => {
            let (id, update) = update_from(args);
            let listing = confirm(
                &app.store,
                "Listing updated",
                "Could not update listing",
                api.update_listing(&id, &update),
            )
            .await?;
            app.emit(&listing, || single(&listing))
        }
        ListingCommands::Delete { id } => {
            let profile = app.require_user().await?;
            if profile.role == Role::Agent {
                let mut board = AgentBoard::load(api).await;
                board.delete_listing(api, &app.store, &id).await?;
                return app.emit(&board, || board.to_string());
            }
            confirm(
                &app.store,
                "Listing deleted",
                "Could not delete listing",
                api.delete_listing(&id),
            )
            .await?;
            Ok(())
        }
        ListingCommands::Approve { id } => {
            app.require_role(&[Role::Admin], "Only admins can approve listings")
                .await?;
            let mut board = AdminBoard::load(api).await;
            board.approve(api, &app.store, &id).await?;
            app.emit(&board, || board.to_string())
        }
        ListingCommands::Reject { id } => {
            app.require_role(&[Role::Admin], "Only admins can reject listings")
                .await?;
            let mut board = AdminBoard::load(api).await;
            board.reject(api, &app.store, &id).await?;
            app.emit(&board, || board.to_string())
        }
    }
}

async fn inquiries(app: &App, action: InquiryCommands) -> anyhow::Result<()> {
    let api = app.session.api();
    match action {
        InquiryCommands::Send { listing_id, message } => {
            app.require_role(&[Role::Client], "Only clients can send inquiries")
                .await?;
            let draft = InquiryDraft {
                listing_id,
                message,
            };
            let mut board = ClientBoard::load(api).await;
            board.send_inquiry(api, &app.store, &draft).await?;
            app.emit(&board, || board.to_string())
        }
        InquiryCommands::List => {
            let profile = app.require_user().await?;
            let inquiries = match profile.role {
                Role::Client => api.client_inquiries().await?,
                Role::Agent => api.agent_inquiries().await?,
                Role::Admin => bail!("admins do not have an inquiry inbox"),
            };
            app.emit(&inquiries, || numbered(&inquiries, inquiry_text))
        }
        InquiryCommands::Respond { id, response } => {
            app.require_role(&[Role::Agent], "Only agents can respond to inquiries")
                .await?;
            let mut board = AgentBoard::load(api).await;
            board.respond(api, &app.store, &id, &response).await?;
            app.emit(&board, || board.to_string())
        }
        InquiryCommands::Close { id } => {
            let profile = app.require_user().await?;
            if profile.role == Role::Agent {
                let mut board = AgentBoard::load(api).await;
                board.close(api, &app.store, &id).await?;
                return app.emit(&board, || board.to_string());
            }
            let inquiry = confirm(
                &app.store,
                "Inquiry closed",
                "Could not close inquiry",
                api.close_inquiry(&id),
            )
            .await?;
            app.emit(&inquiry, || inquiry_text(1, &inquiry))
        }
    }
}

async fn saved(app: &App, action: SavedCommands) -> anyhow::Result<()> {
    let api = app.session.api();
    app.require_role(&[Role::Client], "Only clients can save properties")
        .await?;
    match action {
        SavedCommands::List => {
            let saved = api.saved_properties().await?;
            app.emit(&saved, || numbered(&saved, saved_text))
        }
        SavedCommands::Save { listing_id } => {
            let saved = confirm(
                &app.store,
                "Property saved",
                "Could not save property",
                api.save_property(&listing_id),
            )
            .await?;
            app.emit(&saved, || saved_text(1, &saved))
        }
        SavedCommands::Unsave { listing_id } => {
            confirm(
                &app.store,
                "Property removed from saved",
                "Could not remove property",
                api.unsave_property(&listing_id),
            )
            .await?;
            Ok(())
        }
        SavedCommands::Toggle { listing_id } => {
            let mut board = ClientBoard::load(api).await;
            board.toggle_saved(api, &app.store, &listing_id).await?;
            app.emit(&board, || board.to_string())
        }
        SavedCommands::Check { listing_id } => {
            let is_saved = api.is_saved(&listing_id).await?;
            app.emit(&is_saved, || saved_flag_text(&listing_id, is_saved))
        }
    }
}

async fn agents(app: &App, action: AgentCommands) -> anyhow::Result<()> {
    let api = app.session.api();
    app.require_role(&[Role::Admin], "Only admins can manage agents")
        .await?;
    match action {
        AgentCommands::List => {
            let agents = api.agents().await?;
            app.emit(&agents, || numbered(&agents, agent_text))
        }
        AgentCommands::Toggle { id } => {
            let mut board = AdminBoard::load(api).await;
            board.toggle_agent(api, &app.store, &id).await?;
            app.emit(&board, || board.to_string())
        }
    }
}

async fn payments(app: &App, action: PaymentCommands) -> anyhow::Result<()> {
    let api = app.session.api();
    let status = match action {
        PaymentCommands::Status { listing_id } => api.payment_status(&listing_id).await?,
        PaymentCommands::MarkPaid { listing_id } => {
            confirm(
                &app.store,
                "Payment recorded",
                "Could not record payment",
                api.mark_paid(&listing_id),
            )
            .await?
        }
    };
    app.emit(&status, || payment_text(&status))
}

fn filter_from(args: FilterArgs) -> ListingFilter {
    ListingFilter {
        city: args.city,
        property_type: args.property_type,
        listing_type: args.listing_type,
        min_price: args.min_price,
        max_price: args.max_price,
        min_bedrooms: args.bedrooms,
    }
}

fn draft_from(args: CreateListingArgs) -> ListingDraft {
    ListingDraft {
        title: args.title,
        description: args.description,
        price: Some(args.price),
        address: args.address,
        city: args.city,
        latitude: args.lat,
        longitude: args.lng,
        bedrooms: args.bedrooms,
        bathrooms: args.bathrooms,
        size: args.size,
        property_type: Some(args.property_type),
        listing_type: Some(args.listing_type),
        images: args.images,
    }
}

fn update_from(args: UpdateListingArgs) -> (String, ListingUpdate) {
    let update = ListingUpdate {
        title: args.title,
        description: args.description,
        price: args.price,
        bedrooms: args.bedrooms,
        bathrooms: args.bathrooms,
        size: args.size,
        listing_type: args.listing_type,
    };
    (args.id, update)
}

struct ListingList<'a>(&'a [Listing]);

impl fmt::Display for ListingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No listings found");
        }
        for (i, listing) in self.0.iter().enumerate() {
            write_listing(f, i + 1, listing)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn single(listing: &Listing) -> String {
    let mut text = ListingList(std::slice::from_ref(listing)).to_string();
    if !listing.description.is_empty() {
        text.push_str(&format!("   {}\n", listing.description));
    }
    for image in &listing.images {
        text.push_str(&format!("   Image: {image}\n"));
    }
    text
}

fn numbered<T>(items: &[T], line: impl Fn(usize, &T) -> String) -> String {
    if items.is_empty() {
        return "Nothing here yet\n".to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| line(i + 1, item))
        .collect()
}

fn profile_text(profile: &Profile) -> String {
    format!(
        "{} <{}>\n   Role: {}  ID: {}\n",
        profile.name, profile.email, profile.role, profile.id
    )
}

fn inquiry_text(index: usize, inquiry: &Inquiry) -> String {
    let mut text = format!(
        "{}. {} [{:?}]  ID: {}\n   {}\n",
        index,
        inquiry.listing.title(),
        inquiry.status,
        inquiry.id,
        inquiry.message
    );
    if let Some(response) = &inquiry.response {
        text.push_str(&format!("   Reply: {response}\n"));
    }
    text
}

fn saved_text(index: usize, saved: &SavedProperty) -> String {
    format!(
        "{}. {} (listing {})\n",
        index,
        saved.listing.title(),
        saved.listing.id()
    )
}

fn saved_flag_text(listing_id: &str, saved: bool) -> String {
    if saved {
        format!("Listing {listing_id} is saved\n")
    } else {
        format!("Listing {listing_id} is not saved\n")
    }
}

fn agent_text(index: usize, agent: &AgentAccount) -> String {
    let state = if agent.is_active() { "active" } else { "inactive" };
    format!(
        "{}. {} <{}> {} listings, {}  ID: {}\n",
        index, agent.profile.name, agent.profile.email, agent.listing_count, state, agent.profile.id
    )
}

fn analytics_text(stats: &MarketAnalytics) -> String {
    let mut text = format!(
        "{} listings ({} approved, {} pending, {} rejected)\nAverage price: {:.0}\n",
        stats.total_listings,
        stats.approved_listings,
        stats.pending_listings,
        stats.rejected_listings,
        stats.average_price
    );
    for (heading, buckets) in [("By type", &stats.by_property_type), ("By city", &stats.by_city)] {
        if buckets.is_empty() {
            continue;
        }
        text.push_str(&format!("{heading}:\n"));
        for bucket in buckets {
            match bucket.average_price {
                Some(avg) => text.push_str(&format!(
                    "   {}: {} (avg {:.0})\n",
                    bucket.label, bucket.count, avg
                )),
                None => text.push_str(&format!("   {}: {}\n", bucket.label, bucket.count)),
            }
        }
    }
    text
}

fn comparison_text(comparison: &PropertyComparison) -> String {
    let mut text = String::new();
    if !comparison.summary.is_empty() {
        text.push_str(&format!("{}\n", comparison.summary));
    }
    for side in [&comparison.first, &comparison.second] {
        text.push_str(&format!("\nListing {}\n", side.listing_id));
        for pro in &side.pros {
            text.push_str(&format!("   + {pro}\n"));
        }
        for con in &side.cons {
            text.push_str(&format!("   - {con}\n"));
        }
    }
    text
}

fn payment_text(status: &PaymentStatus) -> String {
    let state = if status.is_paid { "paid" } else { "unpaid" };
    match (status.amount, status.paid_at) {
        (Some(amount), Some(at)) => format!(
            "Listing {}: {} ({:.2}, {})\n",
            status.listing_id,
            state,
            amount,
            at.format("%Y-%m-%d")
        ),
        (Some(amount), None) => {
            format!("Listing {}: {} ({:.2})\n", status.listing_id, state, amount)
        }
        _ => format!("Listing {}: {}\n", status.listing_id, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_market::models::{ComparisonSide, ListingRef};

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(ListingList(&[]).to_string(), "No listings found\n");
        assert_eq!(numbered::<Inquiry>(&[], inquiry_text), "Nothing here yet\n");
    }

    #[test]
    fn comparison_lists_pros_and_cons_per_side() {
        let comparison = PropertyComparison {
            summary: "Both are close to transit".into(),
            first: ComparisonSide {
                listing_id: "l-1".into(),
                pros: vec!["garden".into()],
                cons: vec![],
            },
            second: ComparisonSide {
                listing_id: "l-2".into(),
                pros: vec![],
                cons: vec!["no parking".into()],
            },
        };
        let text = comparison_text(&comparison);
        assert!(text.starts_with("Both are close to transit\n"));
        assert!(text.contains("Listing l-1\n   + garden\n"));
        assert!(text.contains("Listing l-2\n   - no parking\n"));
    }

    #[test]
    fn saved_entries_fall_back_to_the_listing_id() {
        let saved = SavedProperty {
            id: "s-1".into(),
            listing: ListingRef::Id("l-9".into()),
            saved_at: None,
        };
        assert_eq!(saved_text(2, &saved), format!("2. {} (listing l-9)\n", saved.listing.title()));
    }
}
