use super::*;
use crate::{
    bits::{bytes_for_bits, get_bit},
    capture::CaptureSink,
    compositor::{FlushError, FnSink, LineCompositor},
    config::PlaneLayout,
    list::DrawList,
    store::{ImageHeader, NoStore},
    testutil::MemStore,
};
use quickcheck_macros::quickcheck;

fn mono(width: u16, height: u16) -> PanelConfig {
    PanelConfig::new(width, height, PlaneLayout::Mono)
}

fn render<'a, S: crate::store::ImageStore>(
    config: PanelConfig,
    items: impl IntoIterator<Item = DrawItem<'a>>,
    store: &mut S,
) -> CaptureSink {
    let mut list: DrawList<'a, 16> = DrawList::new(config);
    for item in items {
        list.add(item).unwrap();
    }
    let mut sink = CaptureSink::new(config, 0);
    list.flush(&mut sink, store).unwrap();
    sink
}

fn owned(bytes: &[u8], width: u16, height: u16) -> DrawItem<'static> {
    DrawItem::buffered(Pixels::Owned(bytes.to_vec()), width, height)
}

fn top_row_8x8() -> [u8; 8] {
    [0xFF, 0, 0, 0, 0, 0, 0, 0]
}

#[test]
fn full_block_fills_first_byte_of_eight_lines() {
    let sink = render(mono(16, 12), [owned(&[0xFF; 8], 8, 8)], &mut NoStore);
    for row in 0..8 {
        assert_eq!(sink.line(Plane::Black, row), &[0xFF, 0x00], "row {row}");
    }
    for row in 8..12 {
        assert_eq!(sink.line(Plane::Black, row), &[0x00, 0x00], "row {row}");
    }
}

#[test]
fn rotate90_turns_top_row_into_left_column() {
    let item = owned(&top_row_8x8(), 8, 8).rotated(Rotation::Rotate90);
    let sink = render(mono(16, 8), [item], &mut NoStore);
    for row in 0..8 {
        assert_eq!(sink.line(Plane::Black, row)[0], 0x80, "row {row}");
    }
}

#[test]
fn rotate270_turns_top_row_into_right_column() {
    let item = owned(&top_row_8x8(), 8, 8).rotated(Rotation::Rotate270);
    let sink = render(mono(16, 8), [item], &mut NoStore);
    for row in 0..8 {
        assert_eq!(sink.line(Plane::Black, row)[0], 0x01, "row {row}");
    }
}

#[test]
fn rotate180_moves_first_pixel_to_last() {
    let item = owned(&[0x80, 0x00], 8, 2).rotated(Rotation::Rotate180);
    let sink = render(mono(8, 2), [item], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0x00]);
    assert_eq!(sink.line(Plane::Black, 1), &[0x01]);
}

#[test]
fn quarter_turns_of_short_items_land_on_the_right_column() {
    // 8 wide, 5 tall: the footprint is 5 wide once turned.
    let data = [0xFF, 0, 0, 0, 0];
    let left = owned(&data, 8, 5).at(3, 0).rotated(Rotation::Rotate90);
    let right = owned(&data, 8, 5).at(3, 0).rotated(Rotation::Rotate270);

    let sink = render(mono(16, 8), [left], &mut NoStore);
    assert!((0..8).all(|row| sink.line(Plane::Black, row) == [0b0001_0000, 0]));

    let sink = render(mono(16, 8), [right], &mut NoStore);
    assert!((0..8).all(|row| sink.line(Plane::Black, row) == [0b0000_0001, 0]));
}

#[test]
fn two_quarter_turns_equal_a_half_turn() {
    // Asymmetric 8x4 source.
    let source = [0b1100_0001, 0b0100_0000, 0b0000_0110, 0b1000_0000];

    let turned = render(
        mono(4, 8),
        [owned(&source, 8, 4).rotated(Rotation::Rotate90)],
        &mut NoStore,
    );
    let twice = render(
        mono(8, 4),
        [owned(turned.plane(Plane::Black), 4, 8).rotated(Rotation::Rotate90)],
        &mut NoStore,
    );
    let half = render(
        mono(8, 4),
        [owned(&source, 8, 4).rotated(Rotation::Rotate180)],
        &mut NoStore,
    );

    assert_eq!(twice.plane(Plane::Black), half.plane(Plane::Black));
}

#[test]
fn or_unions_and_replace_overwrites_bit_exactly() {
    let base = || owned(&[0xFF], 8, 1);
    let top = || owned(&[0x0F], 8, 1).at(4, 0);

    let sink = render(mono(16, 1), [base(), top()], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0xFF, 0xF0]);

    let sink = render(
        mono(16, 1),
        [base(), top().combined(Combine::Replace)],
        &mut NoStore,
    );
    assert_eq!(sink.line(Plane::Black, 0), &[0xF0, 0xF0]);
}

#[test]
fn later_items_win_under_replace() {
    let sink = render(
        mono(8, 1),
        [
            owned(&[0x00], 8, 1).combined(Combine::Replace),
            owned(&[0xFF], 8, 1),
            owned(&[0x0F], 8, 1).combined(Combine::Replace),
        ],
        &mut NoStore,
    );
    assert_eq!(sink.line(Plane::Black, 0), &[0x0F]);
}

#[test]
fn rotated_mask_clears_its_turned_footprint() {
    let sink = render(
        mono(16, 4),
        [
            owned(&[0xFF; 8], 16, 4),
            DrawItem::mask(2, 6).at(5, 1).rotated(Rotation::Rotate90),
        ],
        &mut NoStore,
    );
    assert_eq!(sink.line(Plane::Black, 0), &[0xFF, 0xFF]);
    assert_eq!(sink.line(Plane::Black, 1), &[0b1111_1000, 0b0001_1111]);
    assert_eq!(sink.line(Plane::Black, 2), &[0b1111_1000, 0b0001_1111]);
    assert_eq!(sink.line(Plane::Black, 3), &[0xFF, 0xFF]);
}

#[test]
fn negative_x_clips_the_left_edge() {
    let sink = render(mono(16, 2), [owned(&[0xFF, 0xAA], 8, 2).at(-3, 0)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0b1111_1000, 0x00]);
    assert_eq!(sink.line(Plane::Black, 1), &[0b0101_0000, 0x00]);
}

#[test]
fn right_and_top_edges_clip() {
    let data = [0xFF, 0x81, 0x81, 0xFF];
    let sink = render(mono(16, 4), [owned(&data, 8, 4).at(12, -2)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0x00, 0b0000_1000]);
    assert_eq!(sink.line(Plane::Black, 1), &[0x00, 0b0000_1111]);
    assert_eq!(sink.line(Plane::Black, 2), &[0x00, 0x00]);
}

#[test]
fn mirrors_flip_in_source_space() {
    let sink = render(mono(8, 1), [owned(&[0b1100_0000], 8, 1).mirrored(true, false)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0b0000_0011]);

    let sink = render(mono(8, 2), [owned(&[0xF0, 0x0F], 8, 2).mirrored(false, true)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0x0F]);
    assert_eq!(sink.line(Plane::Black, 1), &[0xF0]);

    // 12 wide: the padding must not move into view.
    let sink = render(mono(16, 1), [owned(&[0xF0, 0x00], 12, 1).mirrored(true, false)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0x00, 0xF0]);
}

#[test]
fn inversion_stays_inside_the_footprint() {
    let sink = render(mono(16, 1), [owned(&[0b1100_0000], 6, 1).at(1, 0).inverted(true)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0b0001_1110, 0x00]);
}

#[test]
fn dual_color_paints_both_planes() {
    let config = PanelConfig::new(8, 1, PlaneLayout::BlackRed);
    let sink = render(
        config,
        [
            owned(&[0x80], 8, 1).colored(Color::Red),
            owned(&[0x01], 8, 1).colored(Color::Dual),
        ],
        &mut NoStore,
    );
    assert_eq!(sink.line(Plane::Black, 0), &[0x01]);
    assert_eq!(sink.line(Plane::Red, 0), &[0x81]);
}

#[test]
fn dual_color_replace_clears_both_planes() {
    let config = PanelConfig::new(8, 1, PlaneLayout::BlackRed);
    let sink = render(
        config,
        [
            owned(&[0xFF], 8, 1).colored(Color::Black),
            owned(&[0xFF], 8, 1).colored(Color::Red),
            // Four visible columns, all clear; the set low nibble is padding.
            owned(&[0x0F], 4, 1)
                .at(2, 0)
                .colored(Color::Dual)
                .combined(Combine::Replace),
        ],
        &mut NoStore,
    );
    assert_eq!(sink.line(Plane::Black, 0), &[0b1100_0011]);
    assert_eq!(sink.line(Plane::Red, 0), &[0b1100_0011]);
}

#[test]
fn planes_are_emitted_per_line_in_order() {
    let config = PanelConfig::new(8, 2, PlaneLayout::BlackRed);
    let sink = render(config, Vec::<DrawItem<'static>>::new(), &mut NoStore);
    assert_eq!(
        sink.calls(),
        &[
            (Plane::Black, 0),
            (Plane::Red, 0),
            (Plane::Black, 1),
            (Plane::Red, 1)
        ]
    );
    assert!(sink.finished());
}

#[test]
fn polarity_inverts_only_the_output() {
    let mut config = mono(8, 2);
    config.black_inverted = true;
    let sink = render(config, [owned(&[0x80], 8, 1)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0x7F]);
    assert_eq!(sink.line(Plane::Black, 1), &[0xFF]);
}

#[test]
fn inverted_output_keeps_padding_clear() {
    let mut config = mono(12, 1);
    config.black_inverted = true;
    let sink = render(config, [owned(&[0x80, 0x00], 12, 1)], &mut NoStore);
    assert_eq!(sink.line(Plane::Black, 0), &[0x7F, 0xF0]);
}

#[test]
fn stored_two_bpp_image_splits_planes_under_rotation() {
    // 8x2 black plane then 8x2 red plane.
    let mut flash = ImageHeader {
        width: 8,
        height: 2,
        depth: BitDepth::Two,
    }
    .encode()
    .to_vec();
    flash.extend_from_slice(&[0xFF, 0x00, 0x00, 0xFF]);
    let mut store = MemStore::with_flash(flash);

    let config = PanelConfig::new(8, 8, PlaneLayout::BlackRed);
    let item = DrawItem::new(
        Source::Eeprom {
            address: 0,
            depth: BitDepth::Two,
        },
        8,
        2,
    )
    .with_header_offset(ImageHeader::LEN as u16)
    .rotated(Rotation::Rotate90);
    let sink = render(config, [item], &mut store);

    for row in 0..8 {
        assert_eq!(sink.line(Plane::Black, row), &[0b1000_0000], "row {row}");
        assert_eq!(sink.line(Plane::Red, row), &[0b0100_0000], "row {row}");
    }
}

#[test]
fn storage_faults_blank_the_item_and_keep_going() {
    let mut flash = ImageHeader {
        width: 8,
        height: 3,
        depth: BitDepth::One,
    }
    .encode()
    .to_vec();
    flash.extend_from_slice(&[0xFF; 3]);
    let mut store = MemStore::with_flash(flash);

    let config = mono(8, 4);
    let mut list: DrawList<'_, 4> = DrawList::new(config);
    list.add_eeprom_image(0, 0, Color::Black, Rotation::Rotate0, 0, &mut store)
        .unwrap();
    list.add(owned(&[0x01], 8, 1).at(0, 3)).unwrap();
    store.fail_after = Some(store.reads);

    let mut sink = CaptureSink::new(config, 0);
    let stats = list.flush(&mut sink, &mut store).unwrap();
    assert_eq!(stats.faults, 3);
    assert_eq!(stats.lines, 4);
    assert_eq!(sink.line(Plane::Black, 0), &[0x00]);
    assert_eq!(sink.line(Plane::Black, 3), &[0x01]);
}

#[test]
fn full_list_hands_the_item_back() {
    let mut list: DrawList<'_, 2> = DrawList::new(mono(8, 8));
    list.add(owned(&[0xFF], 8, 1)).unwrap();
    list.add(owned(&[0xFF], 8, 1)).unwrap();

    let rejected = list.add(owned(&[0xAB], 8, 1)).unwrap_err();
    assert_eq!(rejected.reason, AddError::ListFull);
    assert!(rejected.item.owns_buffer());
    let Source::Buffered(pixels) = rejected.item.source() else {
        panic!("expected a bitmap item");
    };
    assert_eq!(pixels.as_slice(), &[0xAB]);
    assert_eq!(list.len(), 2);
}

#[test]
fn invalid_geometry_is_rejected() {
    let mut list: DrawList<'_, 4> = DrawList::new(mono(8, 8));
    let empty = list.add(owned(&[], 0, 4)).unwrap_err();
    assert_eq!(empty.reason, AddError::EmptyItem);

    let short = list.add(owned(&[0xFF; 3], 12, 2)).unwrap_err();
    assert_eq!(
        short.reason,
        AddError::BufferTooSmall {
            needed: 4,
            actual: 3
        }
    );
    assert!(list.is_empty());
}

#[test]
fn off_panel_items_are_accepted_but_draw_nothing() {
    let config = mono(16, 4);
    let mut list: DrawList<'_, 4> = DrawList::new(config);
    list.add(owned(&[0xFF], 8, 1).at(40, 0)).unwrap();
    list.add(owned(&[0xFF], 8, 1).at(0, -5)).unwrap();
    assert_eq!(list.items()[0].drawn_width_bytes(), 0);

    let mut sink = CaptureSink::new(config, 0);
    let stats = list.flush(&mut sink, &mut NoStore).unwrap();
    assert_eq!(stats.contributions, 0);
    assert!(sink.plane(Plane::Black).iter().all(|&b| b == 0));
}

#[test]
fn drawn_width_counts_spanned_bytes() {
    let mut item = owned(&[0xFF, 0xFF], 9, 1).at(7, 0);
    item.check_bounds(&mono(32, 1)).unwrap();
    assert_eq!(item.drawn_width_bytes(), 2);

    let mut clipped = owned(&[0xFF, 0xFF], 9, 1).at(12, 0);
    clipped.check_bounds(&mono(16, 1)).unwrap();
    assert_eq!(clipped.drawn_width_bytes(), 1);
}

#[test]
fn flush_releases_owned_buffers_and_empties_the_list() {
    static BORROWED: [u8; 1] = [0xFF];
    let config = mono(8, 4);
    let mut list: DrawList<'_, 8> = DrawList::new(config);
    list.add(owned(&[0xFF], 8, 1)).unwrap();
    list.add(owned(&[0xFF], 8, 1).at(0, 10)).unwrap();
    list.add(DrawItem::buffered(Pixels::Borrowed(&BORROWED), 8, 1).at(0, 2))
        .unwrap();
    list.add(DrawItem::mask(4, 4)).unwrap();

    let mut sink = CaptureSink::new(config, 0);
    let stats = list.flush(&mut sink, &mut NoStore).unwrap();
    assert_eq!(stats.released, 2);
    assert!(list.is_empty());
}

#[test]
fn sink_failure_aborts_and_still_clears() {
    let config = mono(8, 4);
    let mut list: DrawList<'_, 4> = DrawList::new(config);
    list.add(owned(&[0xFF; 4], 8, 4)).unwrap();

    let mut sink = FnSink(|_plane: Plane, row: u16, _line: &[u8]| {
        if row == 2 { Err("spi") } else { Ok(()) }
    });
    assert_eq!(
        list.flush(&mut sink, &mut NoStore),
        Err(FlushError::Sink("spi"))
    );
    assert!(list.is_empty());
}

#[test]
fn render_line_composes_a_single_scanline() {
    let config = mono(16, 4);
    let items = [owned(&[0xFF, 0x0F], 8, 2).at(4, 1)];
    let mut compositor = LineCompositor::new(config);
    let mut line = [0xAAu8; 2];

    let report = compositor.render_line(&items, 2, Plane::Black, &mut NoStore, &mut line);
    assert_eq!(report.contributions, 1);
    assert_eq!(line, [0x00, 0xF0]);
}

/// Sets `dest` for every source pixel, mapping it forward through the
/// mirrors and then the rotation.
fn reference(
    data: &[u8],
    w: usize,
    h: usize,
    item: &DrawItem<'_>,
    panel_w: usize,
    panel_h: usize,
) -> Vec<bool> {
    let stride = bytes_for_bits(w);
    let mut out = vec![false; panel_w * panel_h];
    for sy in 0..h {
        for sx in 0..w {
            if !get_bit(data, sy * stride * 8 + sx) {
                continue;
            }
            let mx = if item.mirror_h { w - 1 - sx } else { sx };
            let my = if item.mirror_v { h - 1 - sy } else { sy };
            let (dx, dy) = match item.rotation {
                Rotation::Rotate0 => (mx, my),
                Rotation::Rotate90 => (my, w - 1 - mx),
                Rotation::Rotate180 => (w - 1 - mx, h - 1 - my),
                Rotation::Rotate270 => (h - 1 - my, mx),
            };
            let px = item.x as isize + dx as isize;
            let py = item.y as isize + dy as isize;
            if (0..panel_w as isize).contains(&px) && (0..panel_h as isize).contains(&py) {
                out[py as usize * panel_w + px as usize] = true;
            }
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
#[quickcheck]
fn compositor_matches_pixel_reference(
    bytes: Vec<u8>,
    w: u8,
    h: u8,
    x: i8,
    y: i8,
    turns: u8,
    mirror_h: bool,
    mirror_v: bool,
) -> bool {
    const PANEL: u16 = 24;
    let (w, h) = (w as usize % 20 + 1, h as usize % 12 + 1);
    let mut data = bytes;
    data.resize(bytes_for_bits(w) * h, 0x5A);

    let rotation = match turns % 4 {
        0 => Rotation::Rotate0,
        1 => Rotation::Rotate90,
        2 => Rotation::Rotate180,
        _ => Rotation::Rotate270,
    };
    let item = owned(&data, w as u16, h as u16)
        .at((x % 28) as i16, (y % 28) as i16)
        .rotated(rotation)
        .mirrored(mirror_h, mirror_v);
    let expected = reference(&data, w, h, &item, PANEL as usize, PANEL as usize);

    let sink = render(mono(PANEL, PANEL), [item], &mut NoStore);
    (0..PANEL).all(|py| {
        (0..PANEL).all(|px| sink.pixel(Plane::Black, px, py) == expected[py as usize * PANEL as usize + px as usize])
    })
}

#[quickcheck]
fn both_mirrors_equal_a_half_turn(bytes: Vec<u8>, w: u8, h: u8) -> bool {
    let (w, h) = (w as usize % 20 + 1, h as usize % 10 + 1);
    let mut data = bytes;
    data.resize(bytes_for_bits(w) * h, 0xC3);

    let config = mono(24, 12);
    let mirrored = render(
        config,
        [owned(&data, w as u16, h as u16).mirrored(true, true)],
        &mut NoStore,
    );
    let turned = render(
        config,
        [owned(&data, w as u16, h as u16).rotated(Rotation::Rotate180)],
        &mut NoStore,
    );
    mirrored.plane(Plane::Black) == turned.plane(Plane::Black)
}
