use glam::Vec3;

/// Colour used for paddles that carry no token.
pub const NEUTRAL_GREY: Vec3 = Vec3::new(0.5, 0.5, 0.5);

fn string_hash(token: &str) -> i32 {
    token
        .bytes()
        .fold(0i32, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as i32))
}

/// Derives a stable colour for a token.
///
/// The magnitude of the hash is split into three channels (`hash / 7`,
/// `hash / 3`, `hash` modulo 255) and the result is normalised, so every
/// token maps to a unit length RGB vector. Empty tokens are grey.
pub fn colour_hash(token: &str) -> Vec3 {
    if token.is_empty() {
        return NEUTRAL_GREY;
    }

    let mut hash = string_hash(token).unsigned_abs();
    if hash == 0 {
        hash = 1;
    }

    let channel = |value: u32| (value % 255) as f32;
    let rgb = Vec3::new(channel(hash / 7), channel(hash / 3), channel(hash));

    // every channel can still land on a multiple of 255
    rgb.try_normalize().unwrap_or(NEUTRAL_GREY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_grey() {
        assert_eq!(colour_hash(""), NEUTRAL_GREY);
    }

    #[test]
    fn hash_is_stable_per_token() {
        assert_eq!(colour_hash("www.example.com"), colour_hash("www.example.com"));
    }

    #[test]
    fn distinct_tokens_usually_differ() {
        assert_ne!(colour_hash("api.example.com"), colour_hash("cdn.example.com"));
    }

    #[test]
    fn negative_hashes_still_get_a_colour() {
        assert!(string_hash("www.example.com") < 0);
        assert!(string_hash("api.example.com") < 0);

        let tokens = ["www.example.com", "api.example.com", "cdn.example.com", "alpha.test"];
        let colours: Vec<Vec3> = tokens.iter().copied().map(colour_hash).collect();
        for (token, colour) in tokens.iter().zip(&colours) {
            assert_ne!(*colour, NEUTRAL_GREY, "{token}");
            assert!((colour.length() - 1.0).abs() < 1e-5, "{token}: {colour:?}");
        }
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn channels_follow_hash_magnitude() {
        // "a" hashes to 97: (97 / 7, 97 / 3, 97) = (13, 32, 97)
        let expected = Vec3::new(13.0, 32.0, 97.0).normalize();
        assert!(colour_hash("a").abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn channels_stay_in_unit_range() {
        for token in ["a", "zz", "127.0.0.1", "pid:4242", "\u{00e9}t\u{00e9}"] {
            let rgb = colour_hash(token);
            for value in rgb.to_array() {
                assert!((0.0..=1.0).contains(&value), "{token}: {rgb:?}");
            }
        }
    }
}
