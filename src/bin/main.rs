use anyhow::{Context, Error};
use marketplace_client::{
    endpoints, AdPayload, BaseUrl, Decision, FileStorage, Marketplace, Route,
};
use reqwest::Client;
use std::path::PathBuf;
use structopt::StructOpt;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting application with {:#?}", args);

    let base_url = BaseUrl::parse(&args.backend)
        .with_context(|| format!("\"{}\" isn't a valid URL", args.backend))?;

    let client = Client::builder()
        .user_agent(marketplace_client::DEFAULT_USER_AGENT)
        .cookie_store(true)
        .build()?;

    // everything we remember between runs lives in this one file
    let storage = FileStorage::open(&args.state);
    log::debug!("Keeping state in \"{}\"", storage.path().display());
    let mut market = Marketplace::open(storage);

    if let Some(route) = args.cmd.route() {
        if let Decision::Redirect(to) = market.navigate(route.name()) {
            match to {
                Route::Login => anyhow::bail!("Please log in first"),
                _ => anyhow::bail!("You are already logged in"),
            }
        }
    }

    match args.cmd {
        Command::Login { email, password } => {
            market.login(&client, &base_url, &email, &password).await?;
            println!("Logged in as {}", email);
        },
        Command::Register { email, password } => {
            market.register(&client, &base_url, &email, &password).await?;
            println!("Registered and logged in as {}", email);
        },
        Command::Logout => {
            market.logout();
            println!("Logged out");
        },
        Command::Whoami => match market.session().user_email() {
            Some(email) => println!("{}", email),
            None => println!("Not logged in"),
        },
        Command::Ads => {
            let ads = endpoints::list_ads(&client, &base_url).await?;

            for ad in &ads {
                let status = if ad.is_sold() { " (sold)" } else { "" };
                println!(
                    "#{} {} size {} for {} by {}{}",
                    ad.id, ad.brand, ad.size, ad.price, ad.owner_email, status
                );
                if let Some(url) = base_url.image_url(ad.image_path.as_deref())
                {
                    println!("    {}", url);
                }
            }
        },
        Command::CreateAd { brand, size, price } => {
            let auth = market.auth_headers()?;
            let payload = AdPayload::new(brand, size, price);

            let id =
                endpoints::create_ad(&client, &base_url, &auth, &payload)
                    .await?;
            println!("Created listing #{}", id);
        },
        Command::UpdateAd {
            id,
            brand,
            size,
            price,
        } => {
            let auth = market.auth_headers()?;
            let payload = AdPayload::new(brand, size, price);

            endpoints::update_ad(&client, &base_url, &auth, id, &payload)
                .await?;
            println!("Updated listing #{}", id);
        },
        Command::DeleteAd { id } => {
            let auth = market.auth_headers()?;
            endpoints::delete_ad(&client, &base_url, &auth, id).await?;
            println!("Deleted listing #{}", id);
        },
        Command::UploadImage { id, file } => {
            let auth = market.auth_headers()?;
            let contents = std::fs::read(&file).with_context(|| {
                format!("Unable to read \"{}\"", file.display())
            })?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("image"));

            endpoints::upload_ad_image(
                &client, &base_url, &auth, id, &file_name, contents,
            )
            .await?;
            println!("Uploaded an image for listing #{}", id);
        },
        Command::DeleteImage { id } => {
            let auth = market.auth_headers()?;
            endpoints::delete_ad_image(&client, &base_url, &auth, id).await?;
            println!("Removed the image from listing #{}", id);
        },
        Command::Add { id } => {
            let ads = endpoints::list_ads(&client, &base_url).await?;
            let ad = ads
                .iter()
                .find(|ad| ad.id == id)
                .with_context(|| format!("There is no listing #{}", id))?;

            if market.add_to_cart(ad)? {
                println!("Added #{} to the cart", id);
            } else {
                println!("#{} is already in the cart", id);
            }
        },
        Command::Remove { id } => {
            if market.cart_mut().remove_from_cart(id) {
                println!("Removed #{} from the cart", id);
            } else {
                println!("#{} isn't in the cart", id);
            }
        },
        Command::Cart => {
            let cart = market.cart();

            for item in cart.items() {
                println!(
                    "#{} {} size {} for {} from {}",
                    item.id, item.brand, item.size, item.price, item.owner_email
                );
            }
            println!("{} item(s)", cart.count());
        },
        Command::Clear => {
            market.cart_mut().clear_cart();
            println!("Emptied the cart");
        },
        Command::Checkout { confirm } => {
            if !confirm {
                anyhow::bail!("Please confirm the purchase with --confirm");
            }

            let bought = market.checkout(&client, &base_url).await?;
            println!("Bought {} item(s)", bought);
        },
        Command::Profile => {
            let auth = market.auth_headers()?;
            let profile = endpoints::profile(&client, &base_url, &auth).await?;

            println!("{}", profile.email);
            println!("  listings: {}", profile.total_ads);
            println!(
                "  sold:     {} (earned {})",
                profile.sold_count, profile.revenue_total
            );
            println!(
                "  bought:   {} (spent {})",
                profile.bought_count, profile.spent_total
            );
        },
        Command::Notifications { mark_read } => {
            let auth = market.auth_headers()?;
            let notifications =
                endpoints::unread_notifications(&client, &base_url, &auth)
                    .await?;

            for notification in &notifications {
                println!("[{}] {}", notification.id, notification.message);

                if mark_read {
                    endpoints::mark_notification_read(
                        &client,
                        &base_url,
                        &auth,
                        notification.id,
                    )
                    .await?;
                }
            }
        },
        Command::Navigate { target } => {
            println!("{}", market.destination(&target));
        },
    }

    Ok(())
}

#[derive(Debug, StructOpt)]
struct Args {
    #[structopt(
        long = "backend",
        env = "MARKETPLACE_BACKEND_URL",
        default_value = "http://localhost:8080",
        help = "The backend's base URL"
    )]
    backend: String,
    #[structopt(
        long = "state",
        env = "MARKETPLACE_STATE",
        default_value = "marketplace-state.json",
        parse(from_os_str),
        help = "Where to remember the session and cart between runs"
    )]
    state: PathBuf,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(about = "Log in to an existing account")]
    Login {
        #[structopt(short = "u", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    #[structopt(about = "Create a new account")]
    Register {
        #[structopt(short = "u", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    #[structopt(about = "Forget the current session")]
    Logout,
    #[structopt(about = "Show who is logged in")]
    Whoami,
    #[structopt(about = "List every listing")]
    Ads,
    #[structopt(about = "Create a new listing")]
    CreateAd {
        #[structopt(long = "brand")]
        brand: String,
        #[structopt(long = "size")]
        size: String,
        #[structopt(long = "price")]
        price: String,
    },
    #[structopt(about = "Change one of your listings")]
    UpdateAd {
        id: i64,
        #[structopt(long = "brand")]
        brand: String,
        #[structopt(long = "size")]
        size: String,
        #[structopt(long = "price")]
        price: String,
    },
    #[structopt(about = "Delete one of your listings")]
    DeleteAd { id: i64 },
    #[structopt(about = "Attach an image to one of your listings")]
    UploadImage {
        id: i64,
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
    #[structopt(about = "Remove a listing's image")]
    DeleteImage { id: i64 },
    #[structopt(about = "Put a listing in the cart")]
    Add { id: i64 },
    #[structopt(about = "Take a listing out of the cart")]
    Remove { id: i64 },
    #[structopt(about = "Show the cart")]
    Cart,
    #[structopt(about = "Empty the cart")]
    Clear,
    #[structopt(about = "Buy everything in the cart")]
    Checkout {
        #[structopt(long = "confirm", help = "Yes, I really want to buy this")]
        confirm: bool,
    },
    #[structopt(about = "Show your profile")]
    Profile,
    #[structopt(about = "Show unread notifications")]
    Notifications {
        #[structopt(long = "mark-read")]
        mark_read: bool,
    },
    #[structopt(about = "Print the page you'd end up on when visiting a route")]
    Navigate { target: String },
}

impl Command {
    /// The page this command belongs to, so the navigation guard can decide
    /// whether it's allowed.
    fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::Register { .. } => Some(Route::Register),
            Command::Ads | Command::Add { .. } => Some(Route::Ads),
            Command::CreateAd { .. }
            | Command::UpdateAd { .. }
            | Command::DeleteAd { .. }
            | Command::UploadImage { .. }
            | Command::DeleteImage { .. } => Some(Route::CreateAd),
            Command::Cart
            | Command::Remove { .. }
            | Command::Clear
            | Command::Checkout { .. } => Some(Route::Cart),
            Command::Profile | Command::Notifications { .. } => {
                Some(Route::Profile)
            },
            Command::Logout | Command::Whoami | Command::Navigate { .. } => None,
        }
    }
}
