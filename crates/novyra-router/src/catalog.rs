// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in business catalog: service categories, packages, canned replies
//! and the default FAQ entries used to seed an empty knowledge base.

use novyra_core::types::{KnowledgeCategory, NewKnowledgeEntry, Package};

/// A service line the matcher recognizes from fixed keyword sets.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCategory {
    pub key: &'static str,
    pub keywords: &'static [&'static str],
    pub content: &'static str,
}

impl ServiceCategory {
    /// `social_media_marketing` becomes `Social Media Marketing`.
    pub fn title(&self) -> String {
        self.key
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn intent(&self) -> String {
        format!("service_{}", self.key)
    }
}

pub const GREETING_PATTERNS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
];

pub const APPRECIATION_PATTERNS: &[&str] = &["thank", "thanks", "appreciate", "grateful", "helpful"];

pub const GOODBYE_PATTERNS: &[&str] = &[
    "bye",
    "goodbye",
    "see you",
    "farewell",
    "later",
    "gotta go",
    "have to go",
    "talk later",
];

pub const PACKAGE_CHOICE_PATTERNS: &[&str] =
    &["choose", "select", "want", "interested", "go with", "pick"];

pub const PRICING_KEYWORDS: &[&str] = &[
    "pricing", "price", "cost", "how much", "packages", "plans", "basic", "premium", "elite",
];

pub const HOURS_KEYWORDS: &[&str] = &[
    "hours",
    "working hours",
    "open",
    "closed",
    "when are you open",
    "business hours",
    "available",
];

pub const GREETING_REPLY: &str =
    "Hello! 👋 I'm here to help you with Novyra Marketing services. What can I assist you with today?";

pub const APPRECIATION_REPLY: &str = "You're very welcome! 😊 I'm glad I could help. Is there anything else you'd like to know about our services?";

pub const GOODBYE_REPLY: &str = "Goodbye! 👋 It was great helping you today. Feel free to come back anytime if you have more questions. Have a wonderful day!";

pub const PACKAGE_SELECTION_REPLY: &str =
    "Great choice! Which package interests you? I can help you get started right away.";

pub const GENERAL_REPLY: &str = "Thank you for reaching out! I'm here to help you. Could you please provide a bit more detail about what you're looking for? I want to make sure I give you the best possible assistance.";

pub const PRICING_CONTENT: &str = "Here are our social media management packages:

📦 **BASIC PACKAGE** - ₦30,000/month
• Social Media Account Setup (up to 3 platforms)
• 3 Branded Posts/Month (Graphics + Captions)
• Ad Account Setup (Facebook/Instagram)
• Basic Page Set-up (Bio, Highlights, CTA Button)
• 1 Promotional Video

📦 **PREMIUM PACKAGE** - ₦45,000/month
• Social Media Account Setup (up to 3 platforms)
• 6 Branded Posts/Month (Graphics + Captions)
• Ad Account Setup (Facebook/Instagram)
• Basic Page Set-up (Bio, Highlights, CTA Button)
• Weekly Performance Check-in
• 3 Promotional Videos

📦 **ELITE PACKAGE** - ₦65,000/month
• Social Media Account Setup (up to 3 platforms)
• 8 Branded Posts/Month (Graphics + Captions)
• 2 Ad Account Setup (Facebook/Instagram)
• Basic Page Set-up (Bio, Highlights, CTA Button)
• Weekly Performance Check-in
• 5 Promotional Videos
• Full Social Media Management

Which package interests you? I can provide more details or help you get started!";

pub const HOURS_CONTENT: &str = "Our Business Hours:
🕐 Monday to Saturday: 9:00 AM to 6:00 PM (WAT)
🚫 Closed on Sundays

We're here to help you during business hours. If you contact us outside these hours, our agents will reach out to you via email as soon as we're open. Feel free to leave your message anytime, and we'll get back to you!";

/// The three social media management packages, cheapest first.
pub fn packages() -> Vec<Package> {
    let package = |name: &str, price: &str, features: &[&str]| Package {
        name: name.to_string(),
        price: price.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
    };
    vec![
        package(
            "Basic",
            "₦30,000/month",
            &[
                "Social Media Account Setup (up to 3 platforms)",
                "3 Branded Posts/Month (Graphics + Captions)",
                "Ad Account Setup (Facebook/Instagram)",
                "1 Promotional Video",
            ],
        ),
        package(
            "Premium",
            "₦45,000/month",
            &[
                "6 Branded Posts/Month (Graphics + Captions)",
                "Weekly Performance Check-in",
                "3 Promotional Videos",
            ],
        ),
        package(
            "Elite",
            "₦65,000/month",
            &[
                "8 Branded Posts/Month (Graphics + Captions)",
                "2 Ad Account Setup (Facebook/Instagram)",
                "5 Promotional Videos",
                "Full Social Media Management",
            ],
        ),
    ]
}

/// Service categories in matching order.
pub const SERVICES: &[ServiceCategory] = &[
    ServiceCategory {
        key: "social_media_marketing",
        keywords: &[
            "social media",
            "instagram",
            "facebook",
            "tiktok",
            "social media marketing",
            "posting",
            "engagement",
            "community management",
            "content calendar",
            "organic traffic",
            "follower loyalty",
            "storytelling",
        ],
        content: "Social Media Marketing at Novyra goes beyond simple posting. We provide comprehensive social media management across Instagram, Facebook, and TikTok, including:

📱 Platforms Covered: Instagram, Facebook, TikTok
✨ Daily Engagement: Active community management to build meaningful connections
🎨 Custom Graphic Design: Professionally designed visuals that align with your brand
📅 Monthly Content Calendar: Strategic content planning with your approval before posting
🚀 Goals: Driving organic traffic to your business, building measurable follower loyalty, and strategic storytelling

Our goal is to create a consistent, engaging online presence that drives real business results and builds a community around your brand.",
    },
    ServiceCategory {
        key: "branding",
        keywords: &[
            "branding",
            "logo",
            "brand identity",
            "brand style",
            "logo design",
            "brand guide",
            "tone of voice",
            "discovery workshop",
            "color palette",
            "typography",
            "value proposition",
        ],
        content: "Our Branding services focus on delivering tangible assets that define your brand:

🎨 Logo Design: Custom logos that capture your brand's essence and make a lasting impression
📋 Brand Style Guides: Comprehensive guides including:
   • Color palettes that reflect your brand personality
   • Typography standards for consistent communication
   • Image standards and photography guidelines
💬 Tone of Voice Documentation: Defining how your brand communicates across all channels
🔍 Discovery Workshop: We conduct workshops to define your brand's unique value proposition

We help you build a cohesive brand identity that sets you apart from the competition and resonates with your target audience.",
    },
    ServiceCategory {
        key: "digital_campaigns",
        keywords: &[
            "digital campaigns",
            "campaign",
            "lead generation",
            "product launch",
            "awareness campaign",
            "conversion tracking",
            "roi",
            "multi-channel",
            "analytics",
        ],
        content: "Our Digital Campaigns service covers planning and executing strategic campaigns:

🎯 Campaign Types:
   • Lead generation campaigns to grow your customer base
   • Product launch campaigns to create buzz and drive sales
   • Awareness campaigns to increase brand visibility
📱 Multi-Channel Execution: Campaigns across various digital platforms for maximum reach
📊 Measurable ROI: Focus on tracking and optimizing for maximum return on investment
🔍 Conversion Tracking: Detailed analytics to measure campaign effectiveness and optimize performance

We create campaigns that drive measurable results and help you achieve your business objectives with data-driven strategies.",
    },
    ServiceCategory {
        key: "content_strategy",
        keywords: &[
            "content strategy",
            "blog",
            "seo",
            "video scripts",
            "website copy",
            "email marketing",
            "content creation",
            "email sequences",
            "seo-optimized",
        ],
        content: "Our Content Strategy service creates high-value content assets that convert:

📝 SEO-Optimized Blog Content: Articles that rank in search engines and drive organic traffic
🎬 Video Scripts: Engaging scripts for your video content that capture attention
✍️ Website Copy Refinement: Optimized copy that converts visitors into customers
📧 Email Marketing Sequences: Automated email campaigns that nurture leads through the sales funnel

All our content is created with one goal: to convert readers into action and drive measurable business growth.",
    },
    ServiceCategory {
        key: "advertising",
        keywords: &[
            "advertising",
            "paid media",
            "google ads",
            "facebook ads",
            "instagram ads",
            "linkedin ads",
            "ad campaign",
            "audience segmentation",
            "ab testing",
            "budget optimization",
            "ad copy",
        ],
        content: "Our Advertising (Paid Media) service manages your paid ad campaigns with precision:

📱 Platforms: Google Ads, Facebook/Instagram Ads, LinkedIn Ads
🎯 Audience Segmentation: Targeting the right audience for maximum impact and conversion
✍️ Ad Copy Creation: Compelling copy that converts viewers into customers
🧪 A/B Testing: Testing creatives and strategies to optimize performance continuously
💰 Budget Optimization: Continuous optimization to maximize efficiency and ROI

We ensure every ad spend delivers maximum value and drives measurable results.",
    },
];

fn faq(title: &str, keywords: &str, content: &str, intent: &str, priority: i32) -> NewKnowledgeEntry {
    NewKnowledgeEntry {
        title: title.to_string(),
        category: KnowledgeCategory::Faq,
        keywords: keywords.to_string(),
        content: content.to_string(),
        intent: Some(intent.to_string()),
        priority,
    }
}

/// FAQ entries inserted by `seed_default_knowledge`, keyed by title.
pub fn default_faqs() -> Vec<NewKnowledgeEntry> {
    vec![
        faq(
            "What services does Novyra offer?",
            "services, what do you offer, what services, offerings",
            "Novyra Marketing offers comprehensive digital marketing services including:

📱 Social Media Marketing - Complete management across Instagram, Facebook, and TikTok
🎨 Branding - Logo design, brand style guides, and brand identity development
📊 Digital Campaigns - Lead generation, product launches, and awareness campaigns
✍️ Content Strategy - SEO-optimized blogs, video scripts, website copy, and email marketing
💰 Advertising - Paid media management on Google, Facebook, Instagram, and LinkedIn

All services are designed to help build brands that scale and drive measurable results.",
            "services",
            10,
        ),
        faq(
            "How much do your services cost?",
            "pricing, cost, price, how much, packages, plans",
            "Novyra offers three social media management packages:

📦 BASIC - ₦30,000/month
• 3 Branded Posts/Month
• Social Media Setup (up to 3 platforms)
• Ad Account Setup
• 1 Promotional Video

📦 PREMIUM - ₦45,000/month
• 6 Branded Posts/Month
• Weekly Performance Check-in
• 3 Promotional Videos
• All Basic features

📦 ELITE - ₦65,000/month
• 8 Branded Posts/Month
• Full Social Media Management
• 5 Promotional Videos
• All Premium features

Contact us for custom pricing on other services like branding, campaigns, and content strategy!",
            "pricing",
            10,
        ),
        faq(
            "What are your business hours?",
            "hours, business hours, when are you open, available, contact hours",
            "Our Business Hours:
🕐 Monday to Saturday: 9:00 AM to 6:00 PM (WAT)
🚫 Closed on Sundays

We're here to help you during business hours. If you contact us outside these hours, our agents will reach out to you via email as soon as we're open!",
            "business_hours",
            9,
        ),
        faq(
            "How long does it take to see results?",
            "results, how long, timeline, when will I see results, time frame",
            "Results vary depending on the service and your goals:

📱 Social Media: You'll see engagement improvements within 2-4 weeks, with significant growth in 2-3 months
🎨 Branding: Complete brand identity packages typically take 4-6 weeks
📊 Campaigns: Initial results can be seen within 1-2 weeks, with optimization ongoing
✍️ Content: SEO content starts ranking in 3-6 months, while engagement content shows results faster

We provide regular performance reports so you can track progress. Our team is committed to delivering measurable results!",
            "timeline",
            8,
        ),
        faq(
            "Do you work with small businesses?",
            "small business, startups, small companies, new business",
            "Absolutely! We work with businesses of all sizes, from startups to established companies.

Our Basic package is perfect for small businesses looking to establish their online presence. We understand that every business has unique needs and budgets, so we offer flexible packages and custom solutions.

Whether you're just starting out or looking to scale, we're here to help you build a brand that grows with your business.",
            "small_business",
            7,
        ),
        faq(
            "Can I see examples of your work?",
            "portfolio, examples, work, case studies, samples",
            "Yes! We'd love to show you examples of our work.

You can:
• Visit our website to see case studies and client testimonials
• Check out our social media accounts to see our content quality
• Request a portfolio presentation tailored to your industry

Contact us and we'll share relevant examples that match your business needs and goals.",
            "portfolio",
            6,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_titles_and_intents() {
        let social = &SERVICES[0];
        assert_eq!(social.title(), "Social Media Marketing");
        assert_eq!(social.intent(), "service_social_media_marketing");
        assert_eq!(SERVICES.len(), 5);
    }

    #[test]
    fn three_packages_with_naira_prices() {
        let names: Vec<_> = packages().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Basic", "Premium", "Elite"]);
        assert!(packages().iter().all(|p| p.price.starts_with('₦')));
    }

    #[test]
    fn default_faqs_priorities() {
        let faqs = default_faqs();
        let priorities: Vec<_> = faqs.iter().map(|f| f.priority).collect();
        assert_eq!(priorities, vec![10, 10, 9, 8, 7, 6]);
        assert!(faqs.iter().all(|f| f.category == KnowledgeCategory::Faq));
    }
}
