use super::{FrameEmbed, escape, layout};
use crate::models::{EnrichedListing, ListingDetails};
use crate::reservation::PurchaseState;

const HOME_GRID_SIZE: usize = 3;

pub fn render_home(listings: &[EnrichedListing], origin: &str) -> String {
    let head = FrameEmbed::storefront(origin).meta_tag();
    let latest = listings
        .iter()
        .take(HOME_GRID_SIZE)
        .map(render_card)
        .collect::<String>();
    let body = format!(
        r#"<h1>farbarter</h1>
<h2>The First On-Chain P2P Marketplace for Farcaster</h2>
<p>Trade anything, anywhere, with anyone, secured by smart contracts and powered by your reputation.</p>
<section>
<h2>Last {count} Listings:</h2>
<div class="grid">{latest}</div>
<p><a href="/listings">View All</a></p>
</section>
<section>
<h2>Getting Started</h2>
<ol>
<li>Have a Farcaster account</li>
<li>Tag @farbarterbot with what you want to sell</li>
<li>Set your price in USDC</li>
<li>Share with your audience!</li>
</ol>
</section>"#,
        count = HOME_GRID_SIZE,
        latest = or_empty(&latest),
    );
    layout("farbarter", &head, &body)
}

pub fn render_index(listings: &[EnrichedListing]) -> String {
    let head = r#"<meta name="description" content="Browse all listings on Farbarter - The P2P Marketplace for Farcaster" />"#;
    let cards = listings.iter().map(render_card).collect::<String>();
    let body = format!(
        r#"<h1>All Listings</h1>
<div class="grid">{}</div>"#,
        or_empty(&cards)
    );
    layout("All Listings - Farbarter", head, &body)
}

fn or_empty(markup: &str) -> &str {
    if markup.is_empty() {
        r#"<p class="muted">No listings yet.</p>"#
    } else {
        markup
    }
}

fn render_card(listing: &EnrichedListing) -> String {
    let record = &listing.listing;
    let pfp = listing
        .seller_profile
        .as_ref()
        .filter(|profile| !profile.pfp.is_empty())
        .map(|profile| {
            format!(
                r#"<img class="pfp" src="{}" alt="Seller" />"#,
                escape(&profile.pfp)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<a class="card" href="/listings/{id}">
<img class="cover" src="{image}" alt="Listing {id}" />
<div class="body">
<div class="row"><strong>{price} USDC</strong><span class="muted">#{id}</span></div>
<div class="row"><span>{pfp}@{handle}</span></div>
<div class="row"><span>Available: {remaining}</span><span>Sales: {sales}</span></div>
</div>
</a>"#,
        id = record.id,
        image = escape(&listing.image_url),
        price = record.price.to_fixed_2(),
        handle = escape(listing.seller_handle()),
        remaining = record.remaining_supply,
        sales = record.total_sales,
    )
}

pub fn render_detail(details: &ListingDetails, purchase: &PurchaseState, origin: &str) -> String {
    let doc = &details.metadata;
    let price = details.price.format_units();
    let id = details.listing_id;

    let mut head = String::new();
    head.push_str(&FrameEmbed::for_listing(details, origin).meta_tag());
    head.push_str(&format!(
        "\n<meta property=\"og:title\" content=\"{}\" />\n<meta property=\"og:description\" content=\"{}\" />\n<meta property=\"og:image\" content=\"{}\" />",
        escape(&doc.name),
        escape(&doc.description),
        escape(&doc.image_url),
    ));
    if let PurchaseState::Reserved {
        expires_in_secs, ..
    } = purchase
    {
        // reverts the page to the plain purchase view once the link lapses
        head.push_str(&format!(
            "\n<meta http-equiv=\"refresh\" content=\"{expires_in_secs};url=/listings/{id}\" />"
        ));
    }

    let body = format!(
        r#"<article>
<img src="{image}" alt="{name}" style="width:100%;max-height:20rem;object-fit:cover;border-radius:0.75rem" />
<p class="muted">Listing #{id}</p>
<h1>{name}</h1>
<p>{description}</p>
<div class="grid">
<div class="stat"><h3>Price</h3><p>{price} USDC</p></div>
<div class="stat"><h3>Available</h3><p>{remaining} left of {supply}</p></div>
<div class="stat"><h3>Location</h3><p>{location}</p></div>
<div class="stat"><h3>Seller</h3><p>FID: {fid}</p></div>
<div class="stat"><h3>Type</h3><p>{kind}</p></div>
</div>
<div style="margin-top:1.5rem">{purchase}</div>
</article>"#,
        image = escape(&doc.image_url),
        name = escape(&doc.name),
        description = escape(&doc.description),
        remaining = details.remaining_supply,
        supply = doc.supply,
        location = escape(&doc.location),
        fid = details.fid,
        kind = if doc.is_online { "Online" } else { "In Person" },
        purchase = render_purchase(id, &price, purchase),
    );
    layout(&doc.name, &head, &body)
}

fn render_purchase(id: u64, price: &str, purchase: &PurchaseState) -> String {
    match purchase {
        PurchaseState::Inactive => r#"<div class="stat muted">Listing Not Available</div>"#.to_string(),
        PurchaseState::SoldOut => r#"<div class="stat muted">SOLD OUT</div>"#.to_string(),
        PurchaseState::Available { notice } => {
            let banner = notice
                .as_deref()
                .map(|text| format!(r#"<p class="notice" role="alert">{}</p>"#, escape(text)))
                .unwrap_or_default();
            format!(
                r#"{banner}<form method="post" action="/listings/{id}/buy" class="row">
<button class="button" type="submit">Buy for {price} USDC</button>
<a class="button" href="/">Back</a>
</form>"#
            )
        }
        PurchaseState::Reserved {
            payment_url,
            expires_in_secs,
        } => format!(
            r#"<a class="button" href="{url}" target="_blank" rel="noopener noreferrer">pay {price} USDC now</a>
<p class="muted">This payment link is reserved for you for {minutes}:{seconds:02}.</p>"#,
            url = escape(payment_url),
            minutes = expires_in_secs / 60,
            seconds = expires_in_secs % 60,
        ),
    }
}

pub fn render_error(status: u16, message: &str) -> String {
    let body = format!(
        r#"<h1>Error</h1>
<p>{}</p>
<p><a class="button" href="/">Back to the storefront</a></p>"#,
        escape(message)
    );
    layout(&format!("Error {status} - Farbarter"), "", &body)
}
