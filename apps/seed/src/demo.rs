//! Demo content: a handful of investigations and the consequences they set
//! off. Offsets are days before the time of seeding.

use lexleaks_core::domain::{ImpactStatus, ImpactType, PostStatus};

pub struct DemoPost {
    pub title: &'static str,
    pub excerpt: &'static str,
    pub content: &'static str,
    pub category: &'static str,
    pub status: PostStatus,
    /// Backdated publication, applied to published posts only.
    pub published_days_ago: i64,
}

pub struct DemoImpact {
    /// Title of the post the impact is attached to.
    pub post: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: ImpactType,
    pub status: ImpactStatus,
    pub days_ago: i64,
}

pub const POSTS: &[DemoPost] = &[
    DemoPost {
        title: "The 'Unlimited Leave' Policy with a Hidden Clause",
        excerpt: "Employment contracts at three tech startups show how 'unlimited' leave ends up meaning less time off.",
        content: "<p>Contracts obtained by LexLeaks make unlimited leave conditional on time off not being \"excessive\", a term the contracts never define.</p>\
<p>Internal figures show average leave dropping from 13.8 to 9.3 days a year after the switch.</p>",
        category: "employment",
        status: PostStatus::Published,
        published_days_ago: 3,
    },
    DemoPost {
        title: "Privacy Violations in Food Delivery Apps: What Your Data is Really Used For",
        excerpt: "Internal documents show a delivery platform sharing user data with marketing firms far beyond its privacy policy.",
        content: "<p>Leaked documents describe order histories, locations and inferred health conditions being passed to third parties.</p>\
<p>Internal emails discuss identifying diabetic users from their orders and offering the segment to insurers.</p>",
        category: "privacy",
        status: PostStatus::Published,
        published_days_ago: 5,
    },
    DemoPost {
        title: "The Shady Side of LegalTech: AI Contract Review Tools Storing Client Data",
        excerpt: "AI contract review platforms keep uploaded legal documents for model training, putting privilege at risk.",
        content: "<p>Terms of service at several contract review platforms grant broad rights to retain uploaded documents.</p>\
<p>A former engineer confirmed that raw client files are used for training.</p>",
        category: "legaltech",
        status: PostStatus::Published,
        published_days_ago: 7,
    },
    DemoPost {
        title: "Judge's Undisclosed Conflict of Interest in Major Environmental Case",
        excerpt: "A federal judge presiding over a landmark environmental suit held investments in the defendant through a trust.",
        content: "<p>Financial disclosures and trust records place a stake in the defendant company within the judge's family trust.</p>\
<p>The holding was never disclosed to the parties.</p>",
        category: "judiciary",
        status: PostStatus::Published,
        published_days_ago: 10,
    },
    DemoPost {
        title: "Law Firm's Secret Commission Deal with Litigation Funders",
        excerpt: "Emails show a firm taking undisclosed commissions from funders whose offers it urged clients to accept.",
        content: "<p>Partner correspondence sets out a commission on every funding agreement a client signed.</p>",
        category: "ethics",
        status: PostStatus::Archived,
        published_days_ago: 90,
    },
    DemoPost {
        title: "Bar Association's Cover-Up of Serial Sexual Harassment",
        excerpt: "A state bar association ignored harassment complaints against prominent attorneys for over a decade.",
        content: "<p>Internal case files show complaints closed without investigation when the accused sat on bar committees.</p>",
        category: "ethics",
        status: PostStatus::Archived,
        published_days_ago: 180,
    },
];

pub const IMPACTS: &[DemoImpact] = &[
    DemoImpact {
        post: "The 'Unlimited Leave' Policy with a Hidden Clause",
        title: "Internal Investigation Launched",
        description: "The companies named in the report hired an independent investigator to review their leave practices.",
        kind: ImpactType::Investigation,
        status: ImpactStatus::InProgress,
        days_ago: 30,
    },
    DemoImpact {
        post: "The 'Unlimited Leave' Policy with a Hidden Clause",
        title: "State Bar Ethics Review",
        description: "The State Bar opened an ethics review of the attorneys who drafted the contracts.",
        kind: ImpactType::Investigation,
        status: ImpactStatus::Pending,
        days_ago: 25,
    },
    DemoImpact {
        post: "Privacy Violations in Food Delivery Apps: What Your Data is Really Used For",
        title: "Managing Partner Resignation",
        description: "The executive responsible for the data partnerships resigned, citing personal reasons.",
        kind: ImpactType::Resignation,
        status: ImpactStatus::Completed,
        days_ago: 15,
    },
    DemoImpact {
        post: "Privacy Violations in Food Delivery Apps: What Your Data is Really Used For",
        title: "Client Compensation Program Established",
        description: "The platform announced a compensation fund for affected users.",
        kind: ImpactType::Reform,
        status: ImpactStatus::InProgress,
        days_ago: 10,
    },
    DemoImpact {
        post: "The Shady Side of LegalTech: AI Contract Review Tools Storing Client Data",
        title: "Federal Investigation Opened",
        description: "Federal prosecutors opened an inquiry into the retention of privileged documents.",
        kind: ImpactType::LegalAction,
        status: ImpactStatus::InProgress,
        days_ago: 20,
    },
    DemoImpact {
        post: "Judge's Undisclosed Conflict of Interest in Major Environmental Case",
        title: "New Ethics Training Mandated",
        description: "The state supreme court mandated new conflict disclosure training, citing the report.",
        kind: ImpactType::PolicyChange,
        status: ImpactStatus::Completed,
        days_ago: 45,
    },
    DemoImpact {
        post: "Judge's Undisclosed Conflict of Interest in Major Environmental Case",
        title: "Legislative Hearing Scheduled",
        description: "Legislators scheduled hearings on judicial disclosure rules and invited the reporters to testify.",
        kind: ImpactType::PolicyChange,
        status: ImpactStatus::Pending,
        days_ago: 5,
    },
];
