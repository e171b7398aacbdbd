//! Event invitation card rendered as a standalone HTML page.
//!
//! Every field comes from the query string. Absent fields take their
//! default; present fields are substituted verbatim, even when empty.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Card fields, named as in the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvitationCard {
    pub title: String,
    pub names: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub contact: String,
    pub rsvp_link: String,
    pub category: String,
    pub social_media: String,
    pub agenda: String,
    pub speakers: String,
    pub fees: String,
    pub audience: String,
    pub dress_code: String,
    pub qr_code: String,
}

impl Default for InvitationCard {
    fn default() -> Self {
        Self {
            title: "Event Invitation".into(),
            names: "John & Jane".into(),
            date: "2025-05-18".into(),
            time: "15:10".into(),
            location: "San Francisco, CA".into(),
            description: "Join us for this special event.".into(),
            organizer: "Event Organizer".into(),
            contact: "123-456-7890".into(),
            rsvp_link: String::new(),
            category: String::new(),
            social_media: String::new(),
            agenda: String::new(),
            speakers: String::new(),
            fees: String::new(),
            audience: String::new(),
            dress_code: String::new(),
            qr_code: String::new(),
        }
    }
}

impl InvitationCard {
    /// Build a card from query parameters. Unknown parameters are ignored.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(params)?;
        serde_json::from_value(value)
    }

    /// Render the full HTML page.
    pub fn render(&self) -> String {
        let social = if self.social_media.is_empty() {
            String::new()
        } else {
            format!(
                r#"<div class="details">Follow us: <a href="{0}" style="color: #ffd; text-decoration: underline;">{0}</a></div>"#,
                self.social_media
            )
        };
        let rsvp = if self.rsvp_link.is_empty() {
            String::new()
        } else {
            format!(r#"<a href="{}" class="btn">RSVP Now</a>"#, self.rsvp_link)
        };
        let qr = if self.qr_code.is_empty() {
            String::new()
        } else {
            format!(r#"<div><img class="qr" src="{}" alt="QR Code"></div>"#, self.qr_code)
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    {style}
</head>
<body>
    <div class="overlay">
        <div class="title">{title}</div>
        <div class="subtitle">{description}</div>
        <div class="divider"></div>
        <div class="subtitle">In honor of: <b>{names}</b></div>
        <div class="subtitle">Hosted by: <b>{organizer}</b></div>
        <div class="subtitle">Category: <b>{category}</b></div>
        <div class="divider"></div>
        <div class="subtitle">Featuring: <b>{speakers}</b></div>
        <div class="date-time">{date}<br>{time}</div>
        <div class="divider"></div>
        <div class="details">Location: <b>{location}</b></div>
        <div class="details">Audience: <b>{audience}</b></div>
        <div class="details">Dress Code: <b>{dress_code}</b></div>
        <div class="details">Fees: <b>{fees}</b></div>
        <div class="details">Agenda: <b>{agenda}</b></div>
        <div class="divider"></div>
        <div class="details">Contact: <b>{contact}</b></div>
        {social}
        {rsvp}
        {qr}
    </div>
</body>
</html>
"#,
            title = self.title,
            style = STYLE,
            description = self.description,
            names = self.names,
            organizer = self.organizer,
            category = or_fallback(&self.category, "General"),
            speakers = or_fallback(&self.speakers, "Special Guests"),
            date = self.date,
            time = self.time,
            location = self.location,
            audience = or_fallback(&self.audience, "Open to All"),
            dress_code = or_fallback(&self.dress_code, "None specified"),
            fees = or_fallback(&self.fees, "Free"),
            agenda = or_fallback(&self.agenda, "To be announced"),
            contact = self.contact,
            social = social,
            rsvp = rsvp,
            qr = qr,
        )
    }
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

const STYLE: &str = r#"<style>
        body {
            background-image: url('https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcSbwalz6n2X0oTW8HMlFXGCL7tpLGtfXQMc2Q&s');
            background-size: cover;
            background-repeat: no-repeat;
            background-position: center;
            font-family: 'Georgia', serif;
            text-align: center;
            color: #fff;
            padding: 50px;
            margin: 0;
        }
        .overlay {
            background: rgba(0, 0, 0, 0.6);
            padding: 40px;
            border-radius: 15px;
            width: 80%;
            margin: auto;
            box-shadow: 0 0 20px #000;
        }
        .title { font-size: 48px; color: #ffe6ff; margin-bottom: 10px; }
        .subtitle { font-size: 24px; margin: 10px 0; }
        .details { font-size: 18px; margin: 8px 0; }
        .divider { border-top: 1px solid #fff; margin: 20px auto; width: 60%; }
        .date-time {
            font-size: 22px;
            background-color: rgba(255, 255, 255, 0.7);
            color: #4a0a4a;
            display: inline-block;
            padding: 10px 25px;
            border-radius: 10px;
            text-shadow: none;
            margin-top: 15px;
        }
        .btn {
            display: inline-block;
            padding: 12px 24px;
            background-color: #fff;
            color: #4a0a4a;
            text-decoration: none;
            border-radius: 8px;
            margin-top: 20px;
            font-weight: bold;
            box-shadow: 0 0 10px #000;
        }
        img.qr {
            margin-top: 20px;
            width: 140px;
            height: 140px;
        }
    </style>"#;
