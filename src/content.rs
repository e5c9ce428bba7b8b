//! Static copy shown on the informational pages.

pub const APP_NAME: &str = "KnowYourBody";

pub const HOME_HEADLINE: &str = "Your University Wellness Guide.";
pub const HOME_SUBTITLE: &str =
    "An AI-powered resource to help you navigate the health and wellness challenges of student life.";
pub const HOME_ACTIONS: [&str; 2] = ["Start Chatting", "Explore Topics"];

pub struct Topic {
    pub title: &'static str,
    pub desc: &'static str,
}

pub const LEARN_TITLE: &str = "Student Wellness Topics";
pub const LEARN_INTRO: &str = "Explore topics curated for the university experience. This section is a work in progress, but will soon feature in-depth articles and resources.";

pub const TOPICS: [Topic; 6] = [
    Topic {
        title: "Managing Academic Stress",
        desc: "Techniques to handle pressure and prevent burnout.",
    },
    Topic {
        title: "Nutrition for Brain Power",
        desc: "Learn which foods can boost focus and memory for exams.",
    },
    Topic {
        title: "The Science of Sleep",
        desc: "Why all-nighters are counterproductive and how to fix your sleep schedule.",
    },
    Topic {
        title: "Ergonomics for Studying",
        desc: "Avoid back and neck pain from long hours at your desk.",
    },
    Topic {
        title: "Navigating Social Health",
        desc: "Tips for building a supportive community on campus.",
    },
    Topic {
        title: "Fitness on a Student Schedule",
        desc: "How to stay active with a busy academic calendar.",
    },
];

pub const ABOUT_TITLE: &str = "Our Mission";
pub const ABOUT_MISSION: [&str; 2] = [
    "University life is a time of immense growth, but it also comes with unique health and wellness challenges. KnowYourBody is designed to be a trustworthy, accessible resource for students seeking to understand their health better.",
    "We provide evidence-based, non-diagnostic information to help you build healthy habits, manage stress, and make informed decisions. Our goal is to empower you with knowledge, so you can thrive both academically and personally.",
];
pub const ABOUT_NOTICE: &str = "This is an educational tool, not a substitute for professional medical advice. Please consult your university's health services for any personal health concerns.";

pub const WELLNESS_TIPS: [&str; 5] = [
    "A 10-minute walk between study sessions can significantly boost your concentration.",
    "Stay hydrated! Drinking enough water is crucial for cognitive function.",
    "Try the 20-20-20 rule to avoid eye strain: every 20 minutes, look at something 20 feet away for 20 seconds.",
    "Tidy your study space before you begin. A clean environment can lead to a clearer mind.",
    "Prioritize 7-9 hours of sleep, especially before an exam. Your brain consolidates memories while you sleep.",
];

pub const PROFILE_TITLE: &str = "Personalize Profile";
pub const PROFILE_TEXT: &str = "This feature is coming soon! You'll be able to tell us a bit about yourself to get more personalized health tips and information.";

pub const CHAT_PLACEHOLDER: &str = "Ask about student wellness...";

/// Pick a tip at random
pub fn random_tip() -> &'static str {
    use rand::seq::SliceRandom;

    WELLNESS_TIPS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(WELLNESS_TIPS[0])
}
