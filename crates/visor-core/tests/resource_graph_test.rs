//! Integration test: resource arena and resource graph
//!
//! Run with: cargo test -p visor-core --test resource_graph_test

use visor_core::{
    Buffer, Framebuffer, Image, Pipeline, RenderPass, ResourceArena, ResourceError, ResourceGraph,
};
use visor_protocol::{Handle, ResourceKind};

#[test]
fn test_first_handle_is_not_null() {
    let mut arena = ResourceArena::new(ResourceKind::Buffer);
    let h = arena.insert(Buffer::new(16));

    assert!(!h.is_null());
    assert_eq!(h.kind, ResourceKind::Buffer);
    assert_eq!(h.generation, 1);
    assert_eq!(arena.get(h).map(Buffer::len), Ok(16));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_null_handle_rejected() {
    let arena: ResourceArena<Buffer> = ResourceArena::new(ResourceKind::Buffer);
    match arena.get(Handle::null(ResourceKind::Buffer)) {
        Err(ResourceError::NullHandle(ResourceKind::Buffer)) => {}
        other => panic!("expected NullHandle, got {:?}", other),
    }
}

#[test]
fn test_removed_handle_is_stale() {
    let mut arena = ResourceArena::new(ResourceKind::Image);
    let old = arena.insert(Image::new(2, 2, 4));
    arena.remove(old).expect("remove");
    assert!(arena.is_empty());

    // The slot is reused under a new generation
    let new = arena.insert(Image::new(4, 4, 4));
    assert_eq!(new.index, old.index);
    assert_ne!(new.generation, old.generation);

    match arena.get(old) {
        Err(ResourceError::StaleHandle(h)) => assert_eq!(h, old),
        other => panic!("expected StaleHandle, got {:?}", other),
    }
    assert_eq!(arena.get(new).map(|img| img.width), Ok(4));
    assert!(!arena.contains(old));
}

#[test]
fn test_double_remove() {
    let mut arena = ResourceArena::new(ResourceKind::Pipeline);
    let h = arena.insert(Pipeline::default());
    arena.remove(h).expect("first remove");
    match arena.remove(h) {
        Err(ResourceError::StaleHandle(_)) => {}
        other => panic!("expected StaleHandle, got {:?}", other),
    }
}

#[test]
fn test_slot_retired_at_generation_ceiling() {
    let mut arena = ResourceArena::with_max_generation(ResourceKind::Buffer, 2);

    let first = arena.insert(Buffer::new(1));
    arena.remove(first).expect("remove first");
    let second = arena.insert(Buffer::new(2));
    assert_eq!(second.index, first.index);
    assert_eq!(second.generation, 2);

    // Generation 2 is the ceiling: the slot is not handed out again
    arena.remove(second).expect("remove second");
    let third = arena.insert(Buffer::new(3));
    assert_ne!(third.index, second.index);
    assert_eq!(third.generation, 1);

    for old in [first, second] {
        match arena.get(old) {
            Err(ResourceError::StaleHandle(h)) => assert_eq!(h, old),
            other => panic!("expected StaleHandle, got {:?}", other),
        }
    }
    assert_eq!(arena.get(third).map(Buffer::len), Ok(3));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_unknown_and_wrong_kind() {
    let arena: ResourceArena<Image> = ResourceArena::new(ResourceKind::Image);

    let forged = Handle::new(ResourceKind::Image, 42, 1);
    match arena.get(forged) {
        Err(ResourceError::UnknownHandle(h)) => assert_eq!(h, forged),
        other => panic!("expected UnknownHandle, got {:?}", other),
    }

    let buffer = Handle::new(ResourceKind::Buffer, 1, 1);
    match arena.get(buffer) {
        Err(ResourceError::WrongKind { handle, expected }) => {
            assert_eq!(handle, buffer);
            assert_eq!(expected, ResourceKind::Image);
        }
        other => panic!("expected WrongKind, got {:?}", other),
    }
}

#[test]
fn test_graph_lookup_by_kind() {
    let mut graph = ResourceGraph::new();
    let image = graph.create_image(Image::new(8, 8, 4));
    let rp = graph.create_render_pass(RenderPass::single_color(0, true));
    let fb = graph.create_framebuffer(Framebuffer {
        attachments: vec![image],
    });
    assert_eq!(graph.len(), 3);

    let attachment = graph
        .render_pass(rp)
        .expect("render pass")
        .primary_color_attachment()
        .copied()
        .expect("color attachment");
    assert_eq!(attachment.index, 0);
    assert!(attachment.clear_on_load);
    assert_eq!(graph.framebuffer(fb).map(|f| f.attachments[0]), Ok(image));

    // Same index, different kind
    assert!(matches!(
        graph.framebuffer(image),
        Err(ResourceError::WrongKind { .. })
    ));
}

#[test]
fn test_graph_destroy() {
    let mut graph = ResourceGraph::new();
    let buffer = graph.create_buffer(Buffer::from_bytes(vec![1u8, 2, 3]));
    graph.destroy(buffer).expect("destroy");

    assert!(graph.is_empty());
    assert!(matches!(
        graph.buffer(buffer),
        Err(ResourceError::StaleHandle(_))
    ));
}

#[test]
fn test_buffer_and_image_borrow() {
    let mut graph = ResourceGraph::new();
    let buffer = graph.create_buffer(Buffer::from_bytes(vec![7u8; 16]));
    let image = graph.create_image(Image::new(2, 2, 4));

    let (src, dst) = graph.buffer_and_image_mut(buffer, image).expect("borrow");
    dst.pixels.copy_from_slice(&src.bytes);
    assert_eq!(graph.image(image).map(|i| i.pixels.clone()), Ok(vec![7u8; 16]));
}

#[test]
fn test_image_from_rgba_checks_size() {
    let image = Image::from_rgba(2, 1, vec![0; 8]).expect("exact size");
    assert_eq!(image.byte_size(), 8);

    match Image::from_rgba(2, 2, vec![0; 8]) {
        Err(ResourceError::PixelSizeMismatch { expected, actual }) => {
            assert_eq!(expected, 16);
            assert_eq!(actual, 8);
        }
        other => panic!("expected PixelSizeMismatch, got {:?}", other),
    }
}

#[test]
fn test_render_pass_without_attachments() {
    let rp = RenderPass::default();
    assert!(rp.primary_color_attachment().is_none());
}
