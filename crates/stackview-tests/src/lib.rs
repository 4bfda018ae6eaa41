//! Integration tests for stackview crates.
//!
//! End-to-end checks across loading, rendering and export.

#[cfg(test)]
mod tests {
    use stackview_core::{ChannelConfig, Plane, Rgb8, Volume};
    use stackview_io::metadata::parse_display_settings;
    use stackview_io::{DisplaySettings, IoError, RawLayout, SampleType};
    use stackview_ops::blend::blend_value;
    use stackview_ops::{BlendMode, DisplaySnapshot, LayerSelection, MergeRange, Session};
    use std::fs::File;
    use tempfile::tempdir;

    fn ramp(width: u32, height: u32) -> Plane {
        let n = (width * height) as usize;
        let data = (0..n).map(|i| i as f32 / (n - 1) as f32).collect();
        Plane::from_data(width, height, data).unwrap()
    }

    /// Decodes an 8-bit RGB PNG.
    fn read_png(path: &std::path::Path) -> (u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(std::io::BufReader::new(File::open(path).unwrap()));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0u8; reader.output_buffer_size().unwrap()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, buf)
    }

    #[test]
    fn test_single_red_channel_pipeline() {
        let layer = ramp(8, 4);
        let vol = Volume::from_planes(vec![vec![layer.clone()]]).unwrap();
        let session = Session::new(vol).unwrap();

        let snapshot = DisplaySnapshot {
            channels: vec![ChannelConfig::with_index(0).color(Rgb8::new(255, 0, 0))],
            selection: LayerSelection::Depth(0),
        };
        let img = session.render(&snapshot).unwrap();

        let expected: Vec<u8> = layer
            .data()
            .iter()
            .map(|&x| (x * 255.0).round() as u8)
            .collect();
        assert_eq!(img.channel(0), expected);
        assert!(img.channel(1).iter().all(|&v| v == 0));
        assert!(img.channel(2).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_identical_layers_maximum_is_identity() {
        let layer = ramp(5, 5);
        let vol = Volume::from_planes(vec![vec![layer.clone(), layer.clone()]]).unwrap();
        let merged = stackview_ops::merge(&vol, 0, MergeRange::new(0, 1), BlendMode::Maximum).unwrap();
        assert_eq!(merged, layer);

        let merged = stackview_ops::merge(&vol, 0, MergeRange::new(1, 0), BlendMode::Maximum).unwrap();
        assert_eq!(merged, layer);
    }

    #[test]
    fn test_divide_by_zero_saturates() {
        assert_eq!(blend_value(BlendMode::Divide, 0.5, 0.0), 1.0);

        let vol = Volume::from_planes(vec![vec![
            Plane::filled(2, 2, 0.5),
            Plane::filled(2, 2, 0.0),
        ]])
        .unwrap();
        let merged = stackview_ops::merge(&vol, 0, MergeRange::new(0, 1), BlendMode::Divide).unwrap();
        assert!(merged.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_every_mode_stays_in_unit_range_through_merge() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0];
        let layers: Vec<Plane> = values.iter().map(|&v| Plane::filled(2, 1, v)).collect();
        let vol = Volume::from_planes(vec![layers]).unwrap();
        for mode in BlendMode::ALL {
            for range in [MergeRange::new(0, 4), MergeRange::new(4, 0)] {
                let merged = stackview_ops::merge(&vol, 0, range, mode).unwrap();
                assert!(
                    merged.data().iter().all(|v| (0.0..=1.0).contains(v)),
                    "{} {}",
                    mode,
                    range
                );
            }
        }
    }

    #[test]
    fn test_tiff_stack_to_png() {
        use tiff::encoder::{colortype, TiffEncoder};

        let dir = tempdir().unwrap();
        let stack = dir.path().join("stack.tif");
        {
            // channel 0: z0 dark, z1 bright; channel 1: z0 bright, z1 dark
            let mut enc = TiffEncoder::new(File::create(&stack).unwrap()).unwrap();
            for v in [0u8, 200, 255, 51] {
                enc.write_image::<colortype::Gray8>(4, 2, &[v; 8]).unwrap();
            }
        }

        let vol = stackview_io::read_tiff_stack(&stack, 2).unwrap();
        assert_eq!((vol.channels(), vol.depth()), (2, 2));

        let session = Session::new(vol).unwrap();
        for z in 0..2 {
            for c in 0..2 {
                assert_eq!(session.histograms().get(z, c).unwrap().total(), 8);
            }
        }

        let mut snapshot = DisplaySnapshot::with_defaults(2);
        snapshot.channels[0].color = Rgb8::new(255, 0, 0);
        snapshot.channels[1].color = Rgb8::new(0, 255, 0);
        snapshot.selection = LayerSelection::resolve(true, 0, MergeRange::new(0, 1), "Maximum (Lighten)")
            .unwrap();
        let img = session.render(&snapshot).unwrap();
        assert_eq!(img.pixel(3, 1), [200, 255, 0]);

        let out = dir.path().join("out.png");
        stackview_io::write(&out, &img).unwrap();
        let (w, h, data) = read_png(&out);
        assert_eq!((w, h), (4, 2));
        assert_eq!(data, img.data());
    }

    #[test]
    fn test_metadata_drops_channel_and_stays_aligned() {
        let xml = r#"<ImageDocument><Metadata><DisplaySetting><Channels>
            <Channel><Color>#FF0000FF</Color><ShortName>DAPI</ShortName></Channel>
            <Channel><ShortName>TL</ShortName></Channel>
            <Channel><Color>#FF00FF00</Color><Low>0.5</Low><High>0.5</High></Channel>
        </Channels></DisplaySetting></Metadata></ImageDocument>"#;
        let meta = parse_display_settings(xml.as_bytes()).unwrap();
        assert_eq!(meta.indices(), vec![0, 2]);

        let vol = Volume::from_planes(vec![
            vec![Plane::filled(2, 1, 1.0)],
            vec![Plane::filled(2, 1, 1.0)],
            vec![Plane::from_data(2, 1, vec![0.4, 0.6]).unwrap()],
        ])
        .unwrap();
        let vol = meta.select(&vol).unwrap();
        let session = Session::new(vol).unwrap();

        let snapshot = DisplaySnapshot {
            channels: meta.entries.into_iter().map(|e| e.config).collect(),
            selection: LayerSelection::Depth(0),
        };
        let img = session.render(&snapshot).unwrap();
        // channel 2 is thresholded at 0.5
        assert_eq!(img.pixel(0, 0), [0, 0, 255]);
        assert_eq!(img.pixel(1, 0), [0, 255, 255]);
    }

    #[test]
    fn test_metadata_with_fewer_channels_than_volume_is_rejected() {
        let xml = r#"<DisplaySetting><Channels>
            <Channel><Color>#FFFF0000</Color></Channel>
            <Channel><Color>#FF00FF00</Color></Channel>
        </Channels></DisplaySetting>"#;
        let meta = parse_display_settings(xml.as_bytes()).unwrap();
        assert_eq!(meta.channels, 2);

        let vol = Volume::from_planes(vec![
            vec![Plane::filled(2, 1, 0.1)],
            vec![Plane::filled(2, 1, 0.2)],
            vec![Plane::filled(2, 1, 0.3)],
        ])
        .unwrap();
        let err = meta.select(&vol).unwrap_err();
        assert!(matches!(err, IoError::DimensionMismatch { .. }), "{}", err);
        assert!(err.to_string().contains("3 channels"), "{}", err);
    }

    #[test]
    fn test_raw_volume_with_settings_file() {
        use byteorder::{LittleEndian, WriteBytesExt};

        let dir = tempdir().unwrap();
        let raw = dir.path().join("vol.raw");
        let mut bytes = Vec::new();
        // 2 channels x 3 depths x 1x2, u16
        for v in [0u16, 0, 32768, 32768, 65535, 65535, 65535, 65535, 0, 0, 0, 0] {
            bytes.write_u16::<LittleEndian>(v).unwrap();
        }
        std::fs::write(&raw, bytes).unwrap();

        let layout = RawLayout::parse("2x3x1x2", SampleType::U16).unwrap();
        let vol = stackview_io::read_raw(&raw, layout).unwrap();

        let yaml = dir.path().join("display.yaml");
        std::fs::write(
            &yaml,
            "mode: Screen\nmerge: [2, 0]\nchannels:\n  - index: 1\n    visible: false\n",
        )
        .unwrap();
        let settings = DisplaySettings::read(&yaml).unwrap();

        let mut entries = stackview_io::metadata::default_entries(vol.channels());
        settings.apply_to(&mut entries).unwrap();

        let [s, e] = settings.merge.unwrap();
        let selection = LayerSelection::resolve(
            true,
            0,
            MergeRange::new(s, e),
            settings.mode.as_deref().unwrap(),
        )
        .unwrap();
        let session = Session::new(vol).unwrap();
        let img = session
            .render(&DisplaySnapshot {
                channels: entries.into_iter().map(|e| e.config).collect(),
                selection,
            })
            .unwrap();
        // screen of 1.0, 0.5, 0.0 saturates; channel 1 hidden
        assert_eq!(img.pixel(0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_unknown_mode_rejected_before_render() {
        let err = LayerSelection::resolve(false, 0, MergeRange::single(0), "Normal").unwrap_err();
        assert!(matches!(err, stackview_ops::OpsError::UnknownBlendMode(name) if name == "Normal"));
    }
}
