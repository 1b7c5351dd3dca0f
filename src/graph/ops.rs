use std::ops::{Add, Div, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    graph::node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
    CONTROL_BLOCK_SIZE,
};

/// Arithmetic shared by audio-rate and control-rate binary nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    /// Division by zero yields zero.
    Divide,
    Min,
    Max,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
        }
    }
}

/// Fixed value on both channels.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f32);

impl Generator for Constant {
    fn render_block(&mut self, out: &mut [Frame], _ctx: &RenderCtx) {
        out.fill(Frame::mono(self.0));
    }
}

/// Per-frame, per-channel combination of two generators.
#[derive(Clone)]
pub struct Binary<A, B> {
    op: BinaryOp,
    a: A,
    b: B,
    scratch: Vec<Frame>,
}

impl<A, B> Binary<A, B> {
    pub fn new(op: BinaryOp, a: A, b: B) -> Self {
        Self {
            op,
            a,
            b,
            scratch: vec![Frame::ZERO; CONTROL_BLOCK_SIZE],
        }
    }
}

impl<A: Generator, B: Generator> Generator for Binary<A, B> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.a.render_block(out, ctx);

        // Blocks longer than the scratch buffer are rendered in pieces.
        let op = self.op;
        for chunk in out.chunks_mut(self.scratch.len()) {
            let rhs = &mut self.scratch[..chunk.len()];
            self.b.render_block(rhs, ctx);
            for (o, r) in chunk.iter_mut().zip(rhs.iter()) {
                *o = o.zip_with(*r, |a, b| op.apply(a, b));
            }
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.a.connect(graph);
        self.b.connect(graph);
    }
}

/// Combine two audio-rate operands with `op`.
pub fn combine<A: IntoGen, B: IntoGen>(op: BinaryOp, a: A, b: B) -> Gen<Binary<A::Node, B::Node>> {
    Gen(Binary::new(op, a.into_gen().0, b.into_gen().0))
}

macro_rules! impl_gen_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<A: Generator, B: IntoGen> $trait<B> for Gen<A> {
            type Output = Gen<Binary<A, B::Node>>;

            fn $method(self, rhs: B) -> Self::Output {
                combine($op, self, rhs)
            }
        }

        impl<B: Generator> $trait<Gen<B>> for f32 {
            type Output = Gen<Binary<Constant, B>>;

            fn $method(self, rhs: Gen<B>) -> Self::Output {
                combine($op, self, rhs)
            }
        }
    };
}

impl_gen_op!(Add, add, BinaryOp::Add);
impl_gen_op!(Sub, sub, BinaryOp::Subtract);
impl_gen_op!(Mul, mul, BinaryOp::Multiply);
impl_gen_op!(Div, div, BinaryOp::Divide);

impl<A: Generator> Neg for Gen<A> {
    type Output = Gen<Binary<Constant, A>>;

    fn neg(self) -> Self::Output {
        combine(BinaryOp::Multiply, -1.0_f32, self)
    }
}

impl<A: Generator> Gen<A> {
    pub fn min<B: IntoGen>(self, other: B) -> Gen<Binary<A, B::Node>> {
        combine(BinaryOp::Min, self, other)
    }

    pub fn max<B: IntoGen>(self, other: B) -> Gen<Binary<A, B::Node>> {
        combine(BinaryOp::Max, self, other)
    }
}
