use crate::common::Persona;

/// Prompt, sampling parameters and canned lines for one persona.
#[derive(Debug)]
pub struct PersonaProfile {
    pub system_prompt: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub phrases: &'static [&'static str],
    pub typing_label: &'static str,
}

static ASSISTANT: PersonaProfile = PersonaProfile {
    system_prompt: "You are a helpful AI assistant inside a messenger app. \
        Answer clearly and briefly, in two or three sentences at most.",
    temperature: 0.7,
    max_tokens: 150,
    phrases: &[
        "That's an interesting question! Let me think about it...",
        "I understand what you're asking. Here's my perspective...",
        "Thanks for sharing that with me. I'd be happy to help!",
        "Great question! Let me provide you with some information...",
        "I see what you mean. That's definitely worth considering.",
        "That's a thoughtful observation. Here are my thoughts...",
        "Interesting point! I think there are several ways to look at this...",
        "I appreciate you asking. Based on my understanding...",
    ],
    typing_label: "AI is typing...",
};

static FRIEND: PersonaProfile = PersonaProfile {
    system_prompt: "You are John, an old friend chatting casually in a messenger. \
        Be warm and informal, use everyday language, ask things back and \
        never mention that you are an AI.",
    temperature: 0.9,
    max_tokens: 300,
    phrases: &[
        "Haha, no way! Tell me more.",
        "Oh nice, how did that go?",
        "Sounds good to me, let's do it!",
        "Ugh, I know that feeling.",
        "Wait, really? That's wild.",
        "Sorry, was out with the dog. What's up?",
        "Totally agree with you there.",
        "We should grab a coffee and talk about it.",
        "Lol, you always say that.",
        "Hmm, not sure. What do you think?",
    ],
    typing_label: "John is typing...",
};

impl Persona {
    pub fn profile(self) -> &'static PersonaProfile {
        match self {
            Persona::Assistant => &ASSISTANT,
            Persona::Friend => &FRIEND,
        }
    }
}
