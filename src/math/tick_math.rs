use crate::error::RangeError;
use alloy_primitives::{I256, U256};

/// Lowest tick with a representable sqrt price, log_1.0001(2^-128).
pub const MIN_TICK: i32 = -887272;
/// Highest tick with a representable sqrt price.
pub const MAX_TICK: i32 = -MIN_TICK;

/// Sqrt price at `MIN_TICK`, the inclusive lower bound for pool prices.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// Sqrt price at `MAX_TICK`, the exclusive upper bound for pool prices.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

const SQRT_10001: I256 = I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
const TICK_LOW: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
const TICK_HIGH: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

/// Converts a tick index into the Q64.96 sqrt price at that tick,
/// or `RangeError::TickOutOfBounds` for ticks outside the global range.
///
/// Bit-exact with the on-chain `TickMath.getSqrtRatioAtTick`: the price
/// is assembled from one precomputed Q128 multiplier per set bit of the
/// tick's absolute value, then rounded up into Q96.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, RangeError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(RangeError::TickOutOfBounds);
    }

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> 128;
            }
        };
    }

    apply_multiplier!(2, 6459403834229662010, 18444899583751176498);
    apply_multiplier!(4, 17226890335427755468, 18443055278223354162);
    apply_multiplier!(8, 2032852871939366096, 18439367220385604838);
    apply_multiplier!(16, 14545316742740207172, 18431993317065449817);
    apply_multiplier!(32, 5129152022828963008, 18417254355718160513);
    apply_multiplier!(64, 4894419605888772193, 18387811781193591352);
    apply_multiplier!(128, 1280255884321894483, 18329067761203520168);
    apply_multiplier!(256, 15924666964335305636, 18212142134806087854);
    apply_multiplier!(512, 8010504389359918676, 17980523815641551639);
    apply_multiplier!(1024, 10668036004952895731, 17526086738831147013);
    apply_multiplier!(2048, 4878133418470705625, 16651378430235024244);
    apply_multiplier!(4096, 9537173718739605541, 15030750278693429944);
    apply_multiplier!(8192, 9972618978014552549, 12247334978882834399);
    apply_multiplier!(16384, 10428997489610666743, 8131365268884726200);
    apply_multiplier!(32768, 9305304367709015974, 3584323654723342297);
    apply_multiplier!(65536, 14301143598189091785, 696457651847595233);
    apply_multiplier!(131072, 7393154844743099908, 26294789957452057);
    apply_multiplier!(262144, 2209338891292245656, 37481735321082);
    apply_multiplier!(524288, 10518117631919034274, 76158723);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // round up while shifting from Q128 down to Q96
    let lower_32_bits = (ratio.as_limbs()[0] & 0xFFFF_FFFF) as u32;
    Ok((ratio >> 32) + U256::from((lower_32_bits != 0) as u64))
}

const SHIFT_32: usize = 32;
const SHIFT_128: usize = 128;

const MASK_128: U256 = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);
const MASK_64: U256 = U256::from_limbs([u64::MAX, 0, 0, 0]);
const MASK_32: U256 = U256::from_limbs([u32::MAX as u64, 0, 0, 0]);
const MASK_16: U256 = U256::from_limbs([u16::MAX as u64, 0, 0, 0]);

#[inline(always)]
fn most_significant_bit_position(mut r: U256) -> u32 {
    let mut msb: u32 = 0;

    if r > MASK_128 {
        msb |= 128;
        r >>= 128;
    }
    if r > MASK_64 {
        msb |= 64;
        r >>= 64;
    }
    if r > MASK_32 {
        msb |= 32;
        r >>= 32;
    }
    if r > MASK_16 {
        msb |= 16;
        r >>= 16;
    }
    if r > U256::from(255u64) {
        msb |= 8;
        r >>= 8;
    }
    if r > U256::from(15u64) {
        msb |= 4;
        r >>= 4;
    }
    if r > U256::from(3u64) {
        msb |= 2;
        r >>= 2;
    }
    if r > U256::ONE {
        msb |= 1;
    }

    msb
}

/// Converts a Q64.96 sqrt price into the greatest tick whose own sqrt
/// price does not exceed it.
///
/// The price must lie in `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`. The binary
/// log is refined over fourteen squaring steps, then both candidate
/// ticks from the fixed-point log are checked against the input.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x_96: U256) -> Result<i32, RangeError> {
    if sqrt_price_x_96 < MIN_SQRT_RATIO || sqrt_price_x_96 >= MAX_SQRT_RATIO {
        return Err(RangeError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x_96 << SHIFT_32;
    let msb = most_significant_bit_position(ratio);

    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: I256 = (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << 64;

    macro_rules! log2_step {
        ($shift:expr) => {{
            r = r.overflowing_mul(r).0 >> U256_127;
            let f = r >> SHIFT_128;
            log_2 |= I256::from_raw(f << $shift);
            r >>= f;
        }};
    }

    log2_step!(63);
    log2_step!(62);
    log2_step!(61);
    log2_step!(60);
    log2_step!(59);
    log2_step!(58);
    log2_step!(57);
    log2_step!(56);
    log2_step!(55);
    log2_step!(54);
    log2_step!(53);
    log2_step!(52);
    log2_step!(51);
    log2_step!(50);

    let log_sqrt10001 = log_2.wrapping_mul(SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW) >> SHIFT_128).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH) >> SHIFT_128).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x_96 {
        tick_high
    } else {
        tick_low
    })
}

/// Rounds a tick to the nearest multiple of `tick_spacing`, clamped so
/// the result stays inside the global tick range.
///
/// Halfway points round toward positive infinity.
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> i32 {
    debug_assert!(tick_spacing > 0);
    debug_assert!((MIN_TICK..=MAX_TICK).contains(&tick));

    let quotient = tick.div_euclid(tick_spacing);
    let remainder = tick.rem_euclid(tick_spacing);
    let rounded = if 2 * remainder >= tick_spacing {
        (quotient + 1) * tick_spacing
    } else {
        quotient * tick_spacing
    };

    if rounded < MIN_TICK {
        rounded + tick_spacing
    } else if rounded > MAX_TICK {
        rounded - tick_spacing
    } else {
        rounded
    }
}

/// Maps a tick to the bitmap word holding its compressed position.
///
/// Compression floors toward negative infinity, matching how on-chain
/// tick bitmaps index words for negative ticks.
pub fn tick_to_word_compressed(tick: i32, tick_spacing: i32) -> i16 {
    let mut compressed = tick / tick_spacing;
    if tick < 0 && tick % tick_spacing != 0 {
        compressed -= 1;
    }
    (compressed >> 8) as i16
}

#[cfg(test)]
mod test {
    use super::*;

    use std::str::FromStr;

    #[test]
    fn sqrt_ratio_at_tick_rejects_out_of_range_ticks() {
        assert!(matches!(
            get_sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(RangeError::TickOutOfBounds)
        ));
        assert!(matches!(
            get_sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(RangeError::TickOutOfBounds)
        ));
    }

    #[test]
    fn sqrt_ratio_at_tick_matches_reference_vectors() {
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(
            get_sqrt_ratio_at_tick(MIN_TICK + 1).unwrap(),
            U256::from(4295343490u64)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK - 1).unwrap(),
            U256::from_str("1461373636630004318706518188784493106690254656249").unwrap()
        );
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);

        // spot values cross-checked against on-chain results
        assert_eq!(
            get_sqrt_ratio_at_tick(0).unwrap(),
            U256::from(79228162514264337593543950336u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(50).unwrap(),
            U256::from(79426470787362580746886972461u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(-50).unwrap(),
            U256::from(79030349367926598376800521322u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(100).unwrap(),
            U256::from(79625275426524748796330556128u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(250).unwrap(),
            U256::from(80224679980005306637834519095u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(500).unwrap(),
            U256::from(81233731461783161732293370115u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(1000).unwrap(),
            U256::from(83290069058676223003182343270u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(2500).unwrap(),
            U256::from(89776708723587163891445672585u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(3000).unwrap(),
            U256::from(92049301871182272007977902845u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(4000).unwrap(),
            U256::from(96768528593268422080558758223u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(5000).unwrap(),
            U256::from(101729702841318637793976746270u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(50000).unwrap(),
            U256::from(965075977353221155028623082916u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(150000).unwrap(),
            U256::from(143194173941309278083010301478497u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(250000).unwrap(),
            U256::from(21246587762933397357449903968194344u128)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(500000).unwrap(),
            U256::from_str("5697689776495288729098254600827762987878").unwrap()
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(738203).unwrap(),
            U256::from_str("847134979253254120489401328389043031315994541").unwrap()
        );
    }

    #[test]
    fn tick_at_sqrt_ratio_rejects_out_of_range_prices() {
        assert!(matches!(
            get_tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::ONE),
            Err(RangeError::SqrtPriceOutOfBounds)
        ));
        assert!(matches!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO),
            Err(RangeError::SqrtPriceOutOfBounds)
        ));
    }

    #[test]
    fn tick_at_sqrt_ratio_at_the_bounds() {
        assert_eq!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(
            get_tick_at_sqrt_ratio(U256::from(4295343490u64)).unwrap(),
            MIN_TICK + 1
        );
        assert_eq!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO - U256::ONE).unwrap(),
            MAX_TICK - 1
        );
    }

    #[test]
    fn tick_at_sqrt_ratio_inverts_sqrt_ratio_at_tick() {
        for tick in [
            MIN_TICK,
            -500000,
            -276325,
            -50,
            0,
            50,
            287,
            276325,
            500000,
            MAX_TICK - 1,
        ] {
            let ratio = get_sqrt_ratio_at_tick(tick).unwrap();
            assert_eq!(get_tick_at_sqrt_ratio(ratio).unwrap(), tick);
            // one below the exact ratio must land on the previous tick
            if tick != MIN_TICK {
                assert_eq!(get_tick_at_sqrt_ratio(ratio - U256::ONE).unwrap(), tick - 1);
            }
        }
    }

    #[test]
    fn nearest_usable_tick_rounds_half_up() {
        assert_eq!(nearest_usable_tick(5, 10), 10);
        assert_eq!(nearest_usable_tick(-5, 10), 0);
        assert_eq!(nearest_usable_tick(4, 10), 0);
        assert_eq!(nearest_usable_tick(-6, 10), -10);
        assert_eq!(nearest_usable_tick(0, 1), 0);
        assert_eq!(nearest_usable_tick(37, 25), 25);
        assert_eq!(nearest_usable_tick(38, 25), 50);
    }

    #[test]
    fn nearest_usable_tick_stays_inside_the_global_range() {
        assert_eq!(nearest_usable_tick(MIN_TICK, 10), -887270);
        assert_eq!(nearest_usable_tick(MAX_TICK, 10), 887270);
        assert_eq!(nearest_usable_tick(MIN_TICK, 1), MIN_TICK);
        assert_eq!(nearest_usable_tick(MAX_TICK, 1), MAX_TICK);
    }

    #[test]
    fn word_positions_floor_toward_negative_infinity() {
        assert_eq!(tick_to_word_compressed(0, 1), 0);
        assert_eq!(tick_to_word_compressed(255, 1), 0);
        assert_eq!(tick_to_word_compressed(256, 1), 1);
        assert_eq!(tick_to_word_compressed(-1, 1), -1);
        assert_eq!(tick_to_word_compressed(-256, 1), -1);
        assert_eq!(tick_to_word_compressed(-257, 1), -2);
        // misaligned negative ticks compress one step lower
        assert_eq!(tick_to_word_compressed(-5, 10), -1);
        assert_eq!(tick_to_word_compressed(-2560, 10), -1);
        assert_eq!(tick_to_word_compressed(-2570, 10), -2);
    }
}
