use std::ffi::c_void;
use std::fmt;
use std::ptr::null;

use gl::Adapter;
use scopeguard::ScopeGuard;

use crate::error::{Error, Result};

/// every vertex starts with a position; it is not part of the attribute list.
const POSITION_SIZE: usize = 3;

/// describes one per-vertex input that follows the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// number of float components.
    pub size: u32,
    pub normalized: bool,
}

impl Attribute {
    pub const fn new(size: u32, normalized: bool) -> Self {
        Self { size, normalized }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePointer {
    pub index: gl::GLuint,
    pub size: gl::GLint,
    pub normalized: bool,
    /// in bytes, from the start of the vertex.
    pub offset: usize,
}

/// interleaved vertex layout: an implicit 3 component position at index 0, followed by the given
/// attributes packed back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// in bytes.
    pub stride: gl::GLsizei,
    pub pointers: Vec<AttributePointer>,
}

impl Layout {
    pub fn new(floats_per_vertex: usize, attributes: &[Attribute]) -> Result<Self> {
        let position = Attribute::new(POSITION_SIZE as u32, false);

        let mut pointers = Vec::with_capacity(attributes.len() + 1);
        let mut offset = 0;
        for (index, attribute) in std::iter::once(&position).chain(attributes).enumerate() {
            if !(1..=4).contains(&attribute.size) {
                return Err(Error::AttributeSize {
                    index,
                    size: attribute.size,
                });
            }
            pointers.push(AttributePointer {
                index: index as gl::GLuint,
                size: attribute.size as gl::GLint,
                normalized: attribute.normalized,
                offset: offset * size_of::<f32>(),
            });
            offset += attribute.size as usize;
        }

        if offset > floats_per_vertex {
            return Err(Error::LayoutOverflow {
                required: offset,
                available: floats_per_vertex,
            });
        }

        Ok(Self {
            stride: (floats_per_vertex * size_of::<f32>()) as gl::GLsizei,
            pointers,
        })
    }

    /// NOTE: a vertex array and the vertex buffer must be bound.
    unsafe fn apply<A: Adapter>(&self, api: &A) {
        for pointer in self.pointers.iter() {
            unsafe {
                api.enable_vertex_attrib_array(pointer.index);
                api.vertex_attrib_pointer(
                    pointer.index,
                    pointer.size,
                    gl::FLOAT,
                    if pointer.normalized { gl::TRUE } else { gl::FALSE },
                    self.stride,
                    pointer.offset as *const c_void,
                );
            }
        }
    }
}

/// A vertex array with its vertex buffer and an optional index buffer, drawn as a triangle list.
pub struct Object<A: Adapter> {
    vao: A::VertexArray,
    vbo: A::Buffer,
    ebo: Option<A::Buffer>,
    layout: Layout,
    vertex_count: gl::GLsizei,
    index_count: gl::GLsizei,
}

impl<A: Adapter> fmt::Debug for Object<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("vao", &self.vao)
            .field("vbo", &self.vbo)
            .field("ebo", &self.ebo)
            .field("layout", &self.layout)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish()
    }
}

impl<A: Adapter> Object<A> {
    /// uploads `vertices` (and `indices`, if any) once; nothing is ever re-uploaded.
    ///
    /// on error every gl object created so far is deleted again.
    pub fn new<const N: usize>(
        api: &A,
        vertices: &[[f32; N]],
        attributes: &[Attribute],
        indices: Option<&[u32]>,
    ) -> Result<Self> {
        if vertices.is_empty() {
            return Err(Error::NoVertices);
        }
        let layout = Layout::new(N, attributes)?;

        let vao = unsafe { api.create_vertex_array() }.map_err(Error::create("vertex array"))?;
        let vao = scopeguard::guard(vao, |vao| unsafe { api.delete_vertex_array(vao) });
        let vbo = unsafe { api.create_buffer() }.map_err(Error::create("vertex buffer"))?;
        let vbo = scopeguard::guard(vbo, |vbo| unsafe { api.delete_buffer(vbo) });

        unsafe { api.bind_vertex_array(Some(*vao)) };
        scopeguard::defer! {
            unsafe { api.bind_vertex_array(None) };
        }

        let vertex_data = vertices.as_flattened();
        unsafe {
            api.bind_buffer(gl::ARRAY_BUFFER, Some(*vbo));
            api.buffer_data(
                gl::ARRAY_BUFFER,
                size_of_val(vertex_data) as gl::GLsizeiptr,
                vertex_data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
            layout.apply(api);
        }

        let ebo = match indices {
            Some(indices) => {
                let ebo = unsafe { api.create_buffer() }.map_err(Error::create("index buffer"))?;
                // NOTE: the element buffer binding is part of the vertex array state, it must
                // stay bound until the vertex array is unbound.
                unsafe {
                    api.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(ebo));
                    api.buffer_data(
                        gl::ELEMENT_ARRAY_BUFFER,
                        size_of_val(indices) as gl::GLsizeiptr,
                        indices.as_ptr() as *const c_void,
                        gl::STATIC_DRAW,
                    );
                }
                Some(ebo)
            }
            None => None,
        };

        let this = Self {
            vao: ScopeGuard::into_inner(vao),
            vbo: ScopeGuard::into_inner(vbo),
            ebo,
            layout,
            vertex_count: vertices.len() as gl::GLsizei,
            index_count: indices.map_or(0, |indices| indices.len() as gl::GLsizei),
        };
        log::debug!("created {this:?}");
        Ok(this)
    }

    pub fn draw(&self, api: &A) {
        unsafe { api.bind_vertex_array(Some(self.vao)) };
        scopeguard::defer! {
            unsafe { api.bind_vertex_array(None) };
        }

        unsafe {
            if self.ebo.is_some() {
                api.draw_elements(gl::TRIANGLES, self.index_count, gl::UNSIGNED_INT, null());
            } else {
                api.draw_arrays(gl::TRIANGLES, 0, self.vertex_count);
            }
        }
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> gl::GLsizei {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> gl::GLsizei {
        self.index_count
    }

    pub fn delete(self, api: &A) {
        log::debug!("deleting vertex array {:?}", self.vao);
        unsafe {
            api.delete_vertex_array(self.vao);
            api.delete_buffer(self.vbo);
            if let Some(ebo) = self.ebo {
                api.delete_buffer(ebo);
            }
        }
    }
}
