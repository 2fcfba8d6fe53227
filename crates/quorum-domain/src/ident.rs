//! Random identifier, token, and room-name generation.

use rand::Rng;

/// Alphabet for room and participant ids. Lowercase only so ids are
/// safe in URLs and case-insensitive lookups.
const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Alphabet for session tokens. Mixed case for entropy density.
const TOKEN_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const ADJECTIVES: [&str; 30] = [
    "brave", "clever", "happy", "swift", "calm", "bold", "bright", "quick", "gentle", "kind",
    "wise", "cool", "epic", "fancy", "grand", "jolly", "keen", "lucky", "merry", "noble",
    "proud", "quiet", "rapid", "sharp", "smart", "sunny", "super", "tiny", "vast", "warm",
];

const ANIMALS: [&str; 30] = [
    "falcon", "dolphin", "penguin", "tiger", "eagle", "panda", "koala", "otter", "fox", "owl",
    "wolf", "bear", "hawk", "lynx", "raven", "shark", "whale", "seal", "deer", "hare",
    "crane", "finch", "gecko", "ibis", "jay", "kiwi", "lemur", "moose", "newt", "ocelot",
];

fn random_string(chars: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| chars[rng.random_range(0..chars.len())] as char)
        .collect()
}

/// An 8-character id for rooms and participants.
pub fn generate_id() -> String {
    random_string(ID_CHARS, 8)
}

/// A 32-character session token.
///
/// This is the bearer credential handed to a participant at join time;
/// it is returned once and never logged or embedded in events.
pub fn generate_session_token() -> String {
    random_string(TOKEN_CHARS, 32)
}

/// A memorable room name like `brave-falcon-07`.
pub fn generate_room_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let animal = ANIMALS[rng.random_range(0..ANIMALS.len())];
    let suffix: u8 = rng.random_range(0..100);
    format!("{adjective}-{animal}-{suffix:02}")
}
