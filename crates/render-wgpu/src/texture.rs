use pasture_common::TextureId;

/// Edge length of every procedural block texture, in texels.
pub const TEXTURE_SIZE: u32 = 16;

fn palette(texture: TextureId) -> ([u8; 4], [u8; 4]) {
    match texture {
        TextureId::Grass => ([86, 160, 62, 255], [66, 132, 48, 255]),
        TextureId::Fence => ([150, 111, 72, 255], [118, 84, 52, 255]),
        TextureId::Crate => ([196, 152, 90, 255], [120, 86, 46, 255]),
    }
}

/// Two-tone RGBA8 pattern for one texture, row-major.
pub fn texture_pixels(texture: TextureId) -> Vec<u8> {
    let (base, accent) = palette(texture);
    let n = TEXTURE_SIZE;
    let mut out = Vec::with_capacity((n * n * 4) as usize);
    for y in 0..n {
        for x in 0..n {
            let accented = match texture {
                // Scattered tufts.
                TextureId::Grass => (x * 7 + y * 13) % 5 == 0,
                // Vertical wood grain.
                TextureId::Fence => x % 4 == 0,
                // Frame plus one diagonal brace.
                TextureId::Crate => x < 2 || y < 2 || x >= n - 2 || y >= n - 2 || x == y,
            };
            out.extend_from_slice(if accented { &accent } else { &base });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_are_full_size_and_two_tone() {
        for t in TextureId::ALL {
            let px = texture_pixels(t);
            assert_eq!(px.len(), (TEXTURE_SIZE * TEXTURE_SIZE * 4) as usize);
            let (base, accent) = palette(t);
            let texels: Vec<&[u8]> = px.chunks(4).collect();
            assert!(texels.iter().any(|c| *c == base));
            assert!(texels.iter().any(|c| *c == accent));
            assert!(texels.iter().all(|c| *c == base || *c == accent));
        }
    }

    #[test]
    fn crate_has_solid_border() {
        let px = texture_pixels(TextureId::Crate);
        let (_, accent) = palette(TextureId::Crate);
        for x in 0..TEXTURE_SIZE as usize {
            assert_eq!(&px[x * 4..x * 4 + 4], &accent);
        }
    }
}
