use url::Url;

/// Platform a social link points at, derived from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialPlatform {
    Github,
    Instagram,
    Facebook,
    Linkedin,
    Youtube,
    Whatsapp,
    Telegram,
    Discord,
    Threads,
    Snapchat,
    Pinterest,
    X,
    Website,
}

const HOSTS: &[(&str, SocialPlatform)] = &[
    ("github.com", SocialPlatform::Github),
    ("instagram.com", SocialPlatform::Instagram),
    ("facebook.com", SocialPlatform::Facebook),
    ("linkedin.com", SocialPlatform::Linkedin),
    ("youtube.com", SocialPlatform::Youtube),
    ("youtu.be", SocialPlatform::Youtube),
    ("whatsapp.com", SocialPlatform::Whatsapp),
    ("wa.me", SocialPlatform::Whatsapp),
    ("telegram.org", SocialPlatform::Telegram),
    ("t.me", SocialPlatform::Telegram),
    ("discord.com", SocialPlatform::Discord),
    ("discord.gg", SocialPlatform::Discord),
    ("threads.net", SocialPlatform::Threads),
    ("snapchat.com", SocialPlatform::Snapchat),
    ("pinterest.com", SocialPlatform::Pinterest),
    ("twitter.com", SocialPlatform::X),
    ("x.com", SocialPlatform::X),
];

impl SocialPlatform {
    pub fn from_url(raw: &str) -> Self {
        let Ok(url) = Url::parse(raw.trim()) else {
            return Self::Website;
        };
        let Some(host) = url.host_str() else {
            return Self::Website;
        };
        let host = host.to_ascii_lowercase();
        HOSTS
            .iter()
            .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
            .map(|(_, platform)| *platform)
            .unwrap_or(Self::Website)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Linkedin => "LinkedIn",
            Self::Youtube => "YouTube",
            Self::Whatsapp => "WhatsApp",
            Self::Telegram => "Telegram",
            Self::Discord => "Discord",
            Self::Threads => "Threads",
            Self::Snapchat => "Snapchat",
            Self::Pinterest => "Pinterest",
            Self::X => "X",
            Self::Website => "Website",
        }
    }

    pub fn brand_color(&self) -> &'static str {
        match self {
            Self::Github => "#f5f5f5",
            Self::Instagram => "#E4405F",
            Self::Facebook => "#1877F2",
            Self::Linkedin => "#0A66C2",
            Self::Youtube => "#FF0000",
            Self::Whatsapp => "#25D366",
            Self::Telegram => "#0088CC",
            Self::Discord => "#5865F2",
            Self::Threads => "#000000",
            Self::Snapchat => "#FFFC00",
            Self::Pinterest => "#BD081C",
            Self::X => "#000000",
            Self::Website => "#f5f5f5",
        }
    }
}
