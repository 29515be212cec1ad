// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channel fills with line masks.

use crate::util::{buffer, const_mask, region, root, rows};
use tessera_cpu::tile::{Tile, TileMemory};
use tessera_cpu::{
    ChannelMode, ColourScheme, Context, Error, Operation, PixelBuffer, Settings, Size, Status,
    fill_channel_with_vertical_line_mask,
};

const BAR: [u8; 5] = [255, 255, 128, 0, 128];

#[test]
fn vertical_line_mask_on_small_region() {
    let target_buffer = buffer(4, 3, ColourScheme::Gray8);
    let target = root(4, 3, ColourScheme::Gray8, &target_buffer);
    let mask = const_mask(1, 5, &BAR);

    let mut ctx = Context::new();
    let status = ctx
        .fill_channel_with_vertical_line_mask(&target, None, &mask, ChannelMode::new(0))
        .unwrap();

    assert_eq!(status, Status::Complete);
    assert_eq!(
        rows::<u8>(&target_buffer, 4),
        [[255; 4], [255; 4], [128; 4]]
    );
}

#[test]
fn vertical_line_mask_repeats_down_each_column() {
    let target_buffer = buffer(4, 12, ColourScheme::Ccca8888);
    target_buffer.fill(0x5A);
    let target = root(4, 12, ColourScheme::Ccca8888, &target_buffer);
    let mask = const_mask(1, 5, &BAR);

    let ctx = Context::new();
    let mut op = Operation::new();
    let status = fill_channel_with_vertical_line_mask(
        &ctx,
        &mut op,
        &target,
        Some(&region(0, 2, 4, 7)),
        &mask,
        ChannelMode::ALPHA_8888,
    )
    .unwrap();
    assert!(status.is_complete());

    let rows = rows::<u32>(&target_buffer, 4);
    for (y, row) in rows.iter().enumerate() {
        let expected = if (2..9).contains(&y) {
            u32::from(BAR[(y - 2) % 5]) << 24
        } else {
            0x5A5A_5A5A
        };
        assert_eq!(row, &[expected; 4], "row {y}");
    }
}

#[test]
fn horizontal_line_mask_repeats_along_each_row() {
    let target_buffer = buffer(7, 2, ColourScheme::Rgb565);
    let target = root(7, 2, ColourScheme::Rgb565, &target_buffer);
    let mask = const_mask(3, 1, &[10, 20, 30]);

    let mut ctx = Context::new();
    let status = ctx
        .fill_channel_with_horizontal_line_mask(&target, None, &mask, ChannelMode::new(1))
        .unwrap();
    assert!(status.is_complete());

    let expected: Vec<u16> = [10, 20, 30, 10, 20, 30, 10]
        .into_iter()
        .map(|v: u16| v << 8)
        .collect();
    assert_eq!(rows::<u16>(&target_buffer, 7), [expected.clone(), expected]);
}

#[test]
fn solid_mask_fills_the_channel() {
    let target_buffer = buffer(5, 4, ColourScheme::Cccn888);
    target_buffer.fill(0xFF);
    let target = root(5, 4, ColourScheme::Cccn888, &target_buffer);
    let mask = const_mask(2, 1, &[200, 200]);

    let mut ctx = Context::new();
    let status = ctx
        .fill_channel_with_horizontal_line_mask(
            &target,
            Some(&region(1, 1, 3, 2)),
            &mask,
            ChannelMode::new(2),
        )
        .unwrap();
    assert!(status.is_complete());

    let rows = rows::<u32>(&target_buffer, 5);
    for (y, row) in rows.iter().enumerate() {
        for (x, pixel) in row.iter().enumerate() {
            let inside = (1..4).contains(&x) && (1..3).contains(&y);
            let expected = if inside { 200 << 16 } else { 0xFFFF_FFFF };
            assert_eq!(*pixel, expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn zero_mask_clears_every_channel() {
    let target_buffer = buffer(3, 3, ColourScheme::Ccca8888);
    target_buffer.fill(0xC3);
    let target = root(3, 3, ColourScheme::Ccca8888, &target_buffer);
    let mask = const_mask(1, 1, &[0]);

    let mut ctx = Context::new();
    let status = ctx
        .fill_channel_with_vertical_line_mask(&target, None, &mask, ChannelMode::ALPHA_8888)
        .unwrap();
    assert!(status.is_complete());

    assert!(target_buffer.bytes().iter().all(|b| *b == 0));
}

#[test]
fn channel_of_32_bit_mask() {
    // Alpha bytes 0x10, 0x20; the colour bytes must be ignored.
    let mask_buffer = PixelBuffer::from_pixels(&[0x10AB_CDEF_u32, 0x2012_3456]);
    let image = Tile::root(
        Size::new(2, 1),
        ColourScheme::Ccca8888,
        TileMemory::Buffer(&mask_buffer),
    )
    .unwrap();
    let mask = image
        .with_colour_scheme(ColourScheme::Channel8in32 { channel: 3 })
        .unwrap();

    let target_buffer = buffer(4, 1, ColourScheme::Gray8);
    let target = root(4, 1, ColourScheme::Gray8, &target_buffer);

    let mut ctx = Context::new();
    let status = ctx
        .fill_channel_with_horizontal_line_mask(&target, None, &mask, ChannelMode::new(0))
        .unwrap();
    assert!(status.is_complete());
    assert_eq!(*target_buffer.bytes(), [0x10, 0x20, 0x10, 0x20]);

    let mut restricted = Context::with_settings(Settings {
        channel_access: false,
        ..Settings::default()
    });
    assert_eq!(
        restricted.fill_channel_with_horizontal_line_mask(
            &target,
            None,
            &mask,
            ChannelMode::new(0)
        ),
        Err(Error::UnsupportedMask(ColourScheme::Channel8in32 {
            channel: 3
        }))
    );
}

#[test]
fn mask_view_inside_a_sheet() {
    // Two line masks stored side by side; the second column is used through a derived resource.
    let sheet_data = [1_u8, 100, 2, 200, 3, 44];
    let sheet = Tile::root(
        Size::new(2, 3),
        ColourScheme::A8,
        TileMemory::Const(&sheet_data),
    )
    .unwrap();
    let column = sheet.derived_resource(region(1, 0, 1, 3)).unwrap();

    let target_buffer = buffer(2, 4, ColourScheme::Gray8);
    let target = root(2, 4, ColourScheme::Gray8, &target_buffer);

    let mut ctx = Context::new();
    let status = ctx
        .fill_channel_with_vertical_line_mask(&target, None, &column, ChannelMode::new(0))
        .unwrap();
    assert!(status.is_complete());

    assert_eq!(
        rows::<u8>(&target_buffer, 2),
        [[100, 100], [200, 200], [44, 44], [100, 100]]
    );
}
