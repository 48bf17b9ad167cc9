use burn::{
    nn::{
        attention::{MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SentExtractConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl SentExtractConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentExtractModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm   = LayerNormConfig::new(self.d_model).init(device);
        let extract_head = LinearConfig::new(self.d_model, 1).init(device);
        let dropout      = DropoutConfig::new(self.dropout).init();
        SentExtractModel {
            token_embedding, position_embedding, layers,
            final_norm, extract_head, dropout,
            max_seq_len: self.max_seq_len,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        use burn::nn::attention::MhaInput;
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct SentExtractModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub extract_head:       Linear<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
}

impl<B: Backend> SentExtractModel<B> {
    /// input_ids: [batch, seq_len], cls_positions: [batch, max_sents]
    /// → logits: [batch, max_sents], one score per sentence slot
    pub fn forward(
        &self,
        input_ids:     Tensor<B, 2, Int>,
        cls_positions: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();
        let [_, max_sents]        = cls_positions.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x);
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]
        let [_, _, d_model] = x.dims();

        // Pick out the hidden state at each sentence's [CLS] position.
        // gather needs the index tensor at the same rank as the input,
        // so [batch, max_sents] is expanded over the feature dimension.
        let index = cls_positions
            .unsqueeze_dim::<3>(2)
            .expand([batch_size, max_sents, d_model]);
        let sent_repr = x.gather(1, index); // [batch, max_sents, d_model]

        self.extract_head
            .forward(sent_repr)             // [batch, max_sents, 1]
            .reshape([batch_size, max_sents])
    }

    /// Forward pass plus masked binary cross-entropy over the
    /// valid sentences. Padding slots (mask 0.0) contribute
    /// nothing to the loss; the denominator is the number of
    /// real sentences in the batch.
    pub fn forward_loss(
        &self,
        input_ids:     Tensor<B, 2, Int>,
        cls_positions: Tensor<B, 2, Int>,
        labels:        Tensor<B, 2>,
        sentence_mask: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(input_ids, cls_positions);

        // BCE = -(y*ln(p) + (1-y)*ln(1-p)), clamped away from 0/1
        // so ln never sees an exact zero.
        let probs = burn::tensor::activation::sigmoid(logits.clone())
            .clamp(1e-7, 1.0 - 1e-7);
        let positive = labels.clone() * probs.clone().log();
        let negative = (labels.neg() + 1.0) * (probs.neg() + 1.0).log();
        let bce = (positive + negative).neg() * sentence_mask.clone();

        let denom = sentence_mask.sum().clamp_min(1.0);
        let loss  = bce.sum().div(denom);
        (loss, logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn tiny_model() -> SentExtractModel<TestBackend> {
        let device = Default::default();
        SentExtractConfig::new(50, 16, 8, 2, 1, 16, 0.0).init(&device)
    }

    #[test]
    fn one_logit_per_sentence_slot() {
        let device = Default::default();
        let model  = tiny_model();
        let input  = Tensor::<TestBackend, 2, Int>::zeros([2, 16], &device);
        let cls    = Tensor::<TestBackend, 2, Int>::from_ints(
            [[0, 5, 9], [0, 4, 8]], &device,
        );
        let logits = model.forward(input, cls);
        assert_eq!(logits.dims(), [2, 3]);
    }

    #[test]
    fn fully_masked_batch_has_zero_loss() {
        let device = Default::default();
        let model  = tiny_model();
        let input  = Tensor::<TestBackend, 2, Int>::zeros([1, 16], &device);
        let cls    = Tensor::<TestBackend, 2, Int>::zeros([1, 2], &device);
        let labels = Tensor::<TestBackend, 2>::zeros([1, 2], &device);
        let mask   = Tensor::<TestBackend, 2>::zeros([1, 2], &device);

        let (loss, _) = model.forward_loss(input, cls, labels, mask);
        let value: f64 = loss.into_scalar().elem::<f64>();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn loss_is_finite_for_real_sentences() {
        let device = Default::default();
        let model  = tiny_model();
        let input  = Tensor::<TestBackend, 2, Int>::zeros([1, 16], &device);
        let cls    = Tensor::<TestBackend, 2, Int>::from_ints([[0, 3]], &device);
        let labels = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0]], &device);
        let mask   = Tensor::<TestBackend, 2>::from_floats([[1.0, 1.0]], &device);

        let (loss, logits) = model.forward_loss(input, cls, labels, mask);
        let value: f64 = loss.into_scalar().elem::<f64>();
        assert!(value.is_finite());
        assert!(value >= 0.0);
        assert_eq!(logits.dims(), [1, 2]);
    }
}
