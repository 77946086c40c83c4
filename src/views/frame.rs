use super::escape;
use crate::models::ListingDetails;
use serde::Serialize;

const FRAME_VERSION: &str = "next";
const LAUNCH_FRAME: &str = "launch_frame";
const APP_NAME: &str = "Farbarter";
const STOREFRONT_IMAGE: &str = "https://github.com/jpfraneto/images/blob/main/farbarter.png?raw=true";
const STOREFRONT_SPLASH_COLOR: &str = "#4D8C97";
const LISTING_SPLASH_COLOR: &str = "#000000";

/// Embed payload read by the host feed renderer from `fc:frame`.
///
/// Field order is part of the contract; serde emits it as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEmbed {
    pub version: &'static str,
    pub image_url: String,
    pub button: FrameButton,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameButton {
    pub title: String,
    pub action: FrameAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
}

impl FrameEmbed {
    pub fn storefront(origin: &str) -> Self {
        Self {
            version: FRAME_VERSION,
            image_url: STOREFRONT_IMAGE.to_string(),
            button: FrameButton {
                title: "Shop Now".to_string(),
                action: FrameAction {
                    kind: LAUNCH_FRAME,
                    name: APP_NAME.to_string(),
                    url: origin.to_string(),
                    splash_image_url: format!("{origin}/splash.jpeg"),
                    splash_background_color: STOREFRONT_SPLASH_COLOR.to_string(),
                },
            },
        }
    }

    pub fn for_listing(details: &ListingDetails, origin: &str) -> Self {
        let image = details.metadata.image_url.clone();
        Self {
            version: FRAME_VERSION,
            image_url: image.clone(),
            button: FrameButton {
                title: format!("Buy for {} USDC", details.price.format_units()),
                action: FrameAction {
                    kind: LAUNCH_FRAME,
                    name: APP_NAME.to_string(),
                    url: format!("{origin}/listings/{}/buy", details.listing_id),
                    splash_image_url: image,
                    splash_background_color: LISTING_SPLASH_COLOR.to_string(),
                },
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn meta_tag(&self) -> String {
        format!(r#"<meta name="fc:frame" content="{}" />"#, escape(&self.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataDocument;
    use crate::price::UsdcAmount;
    use alloy_primitives::Address;

    #[test]
    fn storefront_embed_layout_is_exact() {
        let embed = FrameEmbed::storefront("https://farbarter.com");
        assert_eq!(
            embed.to_json(),
            concat!(
                r#"{"version":"next","imageUrl":"https://github.com/jpfraneto/images/blob/main/farbarter.png?raw=true","#,
                r#""button":{"title":"Shop Now","action":{"type":"launch_frame","name":"Farbarter","#,
                r#""url":"https://farbarter.com","splashImageUrl":"https://farbarter.com/splash.jpeg","#,
                r##""splashBackgroundColor":"#4D8C97"}}}"##
            )
        );
    }

    #[test]
    fn listing_embed_points_at_buy_route() {
        let details = ListingDetails {
            listing_id: 12,
            seller: Address::ZERO,
            fid: 1,
            price: UsdcAmount::from_units(1_500_000),
            remaining_supply: 1,
            metadata_pointer: "cid".into(),
            metadata: MetadataDocument {
                name: "Lamp".into(),
                description: String::new(),
                image_url: "https://img/lamp.png".into(),
                location: String::new(),
                supply: 1,
                is_online: true,
                price: None,
            },
            is_active: true,
            total_sales: 0,
            preferred_token: String::new(),
            preferred_chain: 0,
        };
        let embed = FrameEmbed::for_listing(&details, "https://shop.test");
        assert_eq!(
            embed.to_json(),
            concat!(
                r#"{"version":"next","imageUrl":"https://img/lamp.png","button":{"title":"Buy for 1.5 USDC","#,
                r#""action":{"type":"launch_frame","name":"Farbarter","url":"https://shop.test/listings/12/buy","#,
                r##""splashImageUrl":"https://img/lamp.png","splashBackgroundColor":"#000000"}}}"##
            )
        );
    }

    #[test]
    fn meta_tag_escapes_quotes() {
        let tag = FrameEmbed::storefront("https://farbarter.com").meta_tag();
        assert!(tag.starts_with(r#"<meta name="fc:frame" content="{&quot;version&quot;:&quot;next&quot;"#));
        assert!(!tag["<meta name=\"fc:frame\" content=\"".len()..tag.len() - 4].contains('"'));
    }
}
