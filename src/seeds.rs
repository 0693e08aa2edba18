//! Built-in content: the welcome dialogue, lesson text, quiz bank and chat rules.
//! Any of these can be replaced from `zerog.toml`; these are the defaults.

use crate::domain::{Question, QuizBank};
use crate::knowledge::Rule;

/// Scripted Mission Control introduction, one entry per "Next" click.
pub fn seed_dialogue() -> Vec<String> {
  vec![
    "🛰 Mission Control:\nWelcome aboard, Junior Astronaut!\nThis is Mission Control speaking.".into(),
    "🛰 Mission Control:\nToday's mission: Explore the wonders of zero gravity!".into(),
    "🛰 Mission Control:\nBefore we blast off, here's your briefing:\nIn space, gravity is much weaker than on Earth. That's why astronauts feel almost weightless. They are not flying, but falling around Earth!".into(),
    "🛰 Mission Control:\nWe'll learn how this changes everything:\nhow you eat, move, and even sleep!".into(),
    "🛰 Mission Control:\nReady to float among the stars and become a microgravity expert?\nClick Start Lesson to suit up and begin your space mission!".into(),
  ]
}

/// Static lesson page.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct LessonContent {
  pub title: String,
  pub intro: String,
  pub facts: Vec<String>,
  pub fun_fact: String,
}

pub fn seed_lesson() -> LessonContent {
  LessonContent {
    title: "What is Zero Gravity?".into(),
    intro: "Astronaut: Welcome aboard the spaceship!\nEver wondered why we float here? In space, we feel almost weightless due to something called microgravity.\n\nWhat's really happening?\nOur spaceship and everything inside are actually falling around the Earth, but because we're all falling together, it feels like we're floating!".into(),
    facts: vec![
      "Liquids float in bubbles: you can't pour juice into a cup in space!".into(),
      "Muscles and bones get weaker if astronauts don't exercise daily.".into(),
      "Just a tiny push and you drift across the whole cabin!".into(),
      "Fire burns in a ball, not a tall flame.".into(),
      "Everyday tasks (like eating, brushing teeth, or sleeping) become a funny challenge!".into(),
    ],
    fun_fact: "Did you know astronauts sleep in bags strapped to the walls, so they don't float away while dreaming?".into(),
  }
}

fn q(prompt: &str, options: [&str; 4], correct: usize) -> Question {
  Question {
    prompt: prompt.into(),
    options: options.map(String::from),
    correct,
  }
}

/// The three-question microgravity bank.
pub fn seed_quiz_bank() -> QuizBank {
  QuizBank::new(vec![
    q(
      "Why do astronauts feel weightless?",
      [
        "Because they are free falling around Earth",
        "Because there is no gravity in space",
        "Because they are far from Earth",
        "Because the ship pushes them up",
      ],
      0,
    ),
    q(
      "What is microgravity?",
      [
        "Very small gravity is still present",
        "No gravity at all",
        "Gravity is reversed",
        "Gravity only on Mars",
      ],
      0,
    ),
    q(
      "Why do astronauts have to exercise in space?",
      [
        "To keep bones and muscles strong",
        "To float better",
        "For fun",
        "To use equipment",
      ],
      0,
    ),
  ])
}

pub const MICROGRAVITY_REPLY: &str = "Zero gravity (microgravity) is the condition in which people or objects appear to be weightless. This occurs when everything is falling together around Earth, like astronauts and their spacecraft.";
pub const WHO_ARE_YOU_REPLY: &str = "I'm your friendly astronaut avatar, here to help you explore space and science!";
pub const GREETING_REPLY: &str = "Hello! I'm your space guide. Ask me anything about zero gravity or space!";

/// Avatar line shown once when the chat screen is created.
pub const CHAT_OPENING: &str = "Hello! Ask me anything about zero gravity.";

/// Ordered keyword rules. Anything that matches none of them goes to the summary service.
pub fn seed_rules() -> Vec<Rule> {
  vec![
    Rule::new(&["zero gravity", "microgravity"], MICROGRAVITY_REPLY),
    Rule::new(&["who are you"], WHO_ARE_YOU_REPLY),
    Rule::new(&["hello", "hi"], GREETING_REPLY),
  ]
}
